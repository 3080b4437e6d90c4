//! # Types Module
//!
//! Wire types for the document-creation call.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | Goods-introduction document sent as the request body |
//! | [`Product`] | One product line of a document |
//! | [`Signature`] | Value of the `Signature` request header |
//!
//! ```rust
//! use crpt_client::types::{Document, Product};
//!
//! let doc = Document::introduce_goods("doc-1")
//!     .with_participant_inn("7700000000")
//!     .with_product(Product {
//!         uit_code: Some("010460000000000021abc".into()),
//!         ..Default::default()
//!     });
//! assert_eq!(doc.products.as_ref().map(Vec::len), Some(1));
//! ```

pub mod document;
pub mod signature;

pub use document::{Description, Document, Product, LP_INTRODUCE_GOODS};
pub use signature::Signature;
