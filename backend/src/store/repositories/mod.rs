//! Store backend implementations module.
//!
//! This module contains different implementations of the store traits:
//! - `supabase`: Hosted implementation speaking the Supabase REST surface
//! - `memory`: In-memory implementation for unit testing and local development
pub mod memory;
#[cfg(feature = "supabase-repo")]
pub mod supabase;

pub use memory::MemoryRepository;
#[cfg(feature = "supabase-repo")]
pub use supabase::{SupabaseConfig, SupabaseRepository};
