//! Document payload for `POST /api/v3/lk/documents/create`.
//!
//! Field names are the ones the registry expects on the wire, which mixes
//! snake_case with a couple of camelCase keys. Unset fields are sent as
//! `null`.

use serde::{Deserialize, Serialize};

/// Document type for introducing domestically produced goods into circulation.
pub const LP_INTRODUCE_GOODS: &str = "LP_INTRODUCE_GOODS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub description: Option<Description>,
    pub doc_id: Option<String>,
    pub doc_status: Option<String>,
    pub doc_type: Option<String>,
    #[serde(rename = "importRequest", default)]
    pub import_request: bool,
    pub owner_inn: Option<String>,
    pub participant_inn: Option<String>,
    pub producer_inn: Option<String>,
    pub production_date: Option<String>,
    pub production_type: Option<String>,
    pub products: Option<Vec<Product>>,
    pub reg_date: Option<String>,
    pub reg_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub certificate_document: Option<String>,
    pub certificate_document_date: Option<String>,
    pub certificate_document_number: Option<String>,
    pub owner_inn: Option<String>,
    pub producer_inn: Option<String>,
    pub production_date: Option<String>,
    pub tnved_code: Option<String>,
    pub uit_code: Option<String>,
    pub uitu_code: Option<String>,
}

impl Document {
    /// Start an `LP_INTRODUCE_GOODS` document.
    pub fn introduce_goods(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: Some(doc_id.into()),
            doc_type: Some(LP_INTRODUCE_GOODS.to_string()),
            ..Default::default()
        }
    }

    /// Set the participant INN both on the document and in its description block.
    pub fn with_participant_inn(mut self, inn: impl Into<String>) -> Self {
        let inn = inn.into();
        self.description = Some(Description {
            participant_inn: Some(inn.clone()),
        });
        self.participant_inn = Some(inn);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.get_or_insert_with(Vec::new).push(product);
        self
    }

    /// Encode as the JSON request body.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
