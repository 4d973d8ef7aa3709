pub mod intent;
pub mod taxon;
pub mod text;
