pub mod assistant;
pub mod core;
pub mod corpus;
pub mod embedding;
pub mod history;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector_math;

#[cfg(test)]
mod test_util;
