//! `site/*`: visitable sites, the user's visit history and reviews.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{list_or_empty, Operation};
use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::types::{Enveloped, Site, Visit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSites;

impl Operation for ListSites {
    const NAME: &'static str = "site.all";
    type Body = Enveloped<Vec<Site>>;
    type Output = Vec<Site>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("site/all"))
    }

    fn output(body: Self::Body) -> Vec<Site> {
        list_or_empty(body)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVisitHistory;

impl Operation for ListVisitHistory {
    const NAME: &'static str = "site.visit-history";
    type Body = Enveloped<Vec<Visit>>;
    type Output = Vec<Visit>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("site/visit-history"))
    }

    fn output(body: Self::Body) -> Vec<Visit> {
        list_or_empty(body)
    }
}

/// Attach a review to one visit. Only `content` travels in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReview {
    pub visit_id: String,
    pub content: String,
}

#[derive(Serialize)]
struct ReviewBody<'a> {
    content: &'a str,
}

impl Operation for WriteReview {
    const NAME: &'static str = "site.review";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        if self.visit_id.is_empty() {
            return Err(ApiError::InvalidRequest("visit id is empty".to_string()));
        }
        RequestDescriptor::put("site/review")
            .segment(&self.visit_id)
            .json(&ReviewBody { content: &self.content })
    }

    fn output(_body: IgnoredAny) {}
}
