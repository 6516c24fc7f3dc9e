//! Marker derive for records read by `telemetry-codegen`.
//!
//! The generator works on source, not on expanded code, so the derive emits
//! nothing. Its only job is to register the `#[telemetry(...)]` field
//! attribute so that annotated records still compile:
//!
//! ```ignore
//! #[derive(telemetry_codegen::Record)]
//! pub struct Data {
//!     /// Number of nodes in the cluster.
//!     pub node_count: i64,
//!     #[telemetry(embed)]
//!     pub cluster: Cluster,
//! }
//! ```

use proc_macro::TokenStream;

#[proc_macro_derive(Record, attributes(telemetry))]
pub fn derive_record(_input: TokenStream) -> TokenStream {
    TokenStream::new()
}
