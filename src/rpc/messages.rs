//! Request and response messages of the RPC façade.
//!
//! Field names are camelCase on the wire. An absent `fieldMask` means
//! "every field".

use serde::{Deserialize, Serialize};

use crate::handlers::pairs::{PairSortField, PairsFilter};
use crate::handlers::query::{Pagination, Projection, SortOrder};
use crate::types::{FeesCollectorPatch, FullSnapshot, InitCounts, Pair, Token};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyRequest {}

/// `GetAllX` and `GetFeesCollector`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMaskRequest {
    #[serde(default)]
    pub field_mask: Vec<String>,
}

/// Point lookup of pairs, farms, staking farms or staking proxies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressesRequest {
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub field_mask: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiersRequest {
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub field_mask: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairsRequest {
    pub token_id: String,
    #[serde(default)]
    pub field_mask: Vec<String>,
}

/// `GetFilteredX` for every entity kind; `F` is the entity's filter set and
/// `S` its sort field enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "F: Deserialize<'de> + Default, S: Deserialize<'de>"))]
pub struct FilteredRequest<F, S> {
    #[serde(default)]
    pub filters: F,
    #[serde(default)]
    pub sort_field: Option<S>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub field_mask: Vec<String>,
}

impl<F, S: Copy> FilteredRequest<F, S> {
    pub fn sort(&self) -> Option<(S, SortOrder)> {
        self.sort_field.map(|field| (field, self.sort_order))
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairsWithTokensRequest {
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub pair_field_mask: Vec<String>,
    #[serde(default)]
    pub token_field_mask: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPairsWithTokensRequest {
    #[serde(default)]
    pub filters: PairsFilter,
    #[serde(default)]
    pub sort_field: Option<PairSortField>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub pair_field_mask: Vec<String>,
    #[serde(default)]
    pub token_field_mask: Vec<String>,
}

/// `UpdateX`: partial records keyed by their identifier plus the names of
/// the fields to copy from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct UpdateRequest<P> {
    #[serde(default = "Vec::new")]
    pub partials: Vec<P>,
    #[serde(default)]
    pub update_mask: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeesCollectorRequest {
    pub partial: FeesCollectorPatch,
    #[serde(default)]
    pub update_mask: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPairRequest {
    pub pair: Pair,
    pub first_token: Token,
    pub second_token: Token,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPairLpTokenRequest {
    pub address: String,
    pub token: Token,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTimekeepingRequest {
    pub sc_address: String,
    #[serde(default)]
    pub field_mask: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitStateRequest {
    pub snapshot: FullSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
    pub items: Vec<Projection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResponse {
    pub items: Vec<Projection>,
    /// Matches before pagination.
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResponse {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesCollectorResponse {
    pub fees_collector: Option<Projection>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitStateResponse {
    pub generation: u64,
    pub counts: InitCounts,
}
