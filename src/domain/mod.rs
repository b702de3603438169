// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits shared by every other layer:
// no Burn types, no file I/O.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Token <-> index mapping and its builder
pub mod vocabulary;

// A source/target sentence pair from a bilingual corpus
pub mod sentence_pair;

// Seams implemented by the data, ml and infra layers
pub mod traits;
