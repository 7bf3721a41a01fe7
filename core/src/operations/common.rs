//! `common/*`: reference data and legal documents. All public.

use serde::{Deserialize, Serialize};

use super::{list_or_empty, Operation};
use crate::error::ApiError;
use crate::normalize::ResponseKind;
use crate::request::RequestDescriptor;
use crate::types::{City, Country, Enveloped, TermType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCountries;

impl Operation for ListCountries {
    const NAME: &'static str = "common.country";
    type Body = Enveloped<Vec<Country>>;
    type Output = Vec<Country>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("common/country").public())
    }

    fn output(body: Self::Body) -> Vec<Country> {
        list_or_empty(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCities {
    pub country_code: String,
}

impl Operation for ListCities {
    const NAME: &'static str = "common.city";
    type Body = Enveloped<Vec<City>>;
    type Output = Vec<City>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("common/city")
            .public()
            .query("countryCode", &self.country_code))
    }

    fn output(body: Self::Body) -> Vec<City> {
        list_or_empty(body)
    }
}

/// HTML of a legal document. The body is raw text, not an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTermPolicy {
    pub term: TermType,
}

impl Operation for GetTermPolicy {
    const NAME: &'static str = "common.html";
    const RESPONSE: ResponseKind = ResponseKind::Text;
    type Body = Option<String>;
    type Output = String;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("common/html").public().segment(self.term.as_str()))
    }

    fn output(body: Option<String>) -> String {
        body.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::output_of;
    use crate::request::RequestBuilder;
    use crate::config::ClientConfig;

    #[test]
    fn city_list_without_data_is_empty() {
        assert!(output_of::<ListCities>("{}").is_empty());
        assert!(output_of::<ListCities>("").is_empty());
    }

    #[test]
    fn city_list_decodes_entries() {
        let cities = output_of::<ListCities>(
            r#"{"data":[{"id":"1835848","name":"Seoul","countryCode":"KR"},{"id":"1838524","name":"Busan"}]}"#,
        );
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name.as_deref(), Some("Seoul"));
    }

    #[test]
    fn city_query_is_encoded() {
        let builder = RequestBuilder::from_config(&ClientConfig::new("http://localhost:3000")).unwrap();
        let op = ListCities { country_code: "KR".into() };
        let req = builder.build(&op.descriptor().unwrap(), None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/v1/common/city?countryCode=KR");
    }

    #[test]
    fn term_policy_is_raw_html() {
        let op = GetTermPolicy { term: TermType::PrivacyPolicy };
        assert_eq!(op.descriptor().unwrap().path(), "common/html/privacy-policy");
        assert_eq!(output_of::<GetTermPolicy>("<h1>Privacy</h1>"), "<h1>Privacy</h1>");
        assert_eq!(output_of::<GetTermPolicy>(""), "");
    }
}
