pub mod cli;
pub mod pruvo;
pub mod supabase;
