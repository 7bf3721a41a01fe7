use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{data, Data};
use crate::error::AppError;

#[derive(Clone, Debug, Serialize)]
pub struct Country {
    pub name: &'static str,
    pub code: &'static str,
    pub code_3: &'static str,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: &'static str,
    pub name: &'static str,
    pub country_code: &'static str,
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub timezone: &'static str,
}

pub const COUNTRIES: &[Country] = &[
    Country { name: "Korea, Republic of", code: "KR", code_3: "KOR" },
    Country { name: "Japan", code: "JP", code_3: "JPN" },
    Country { name: "United States", code: "US", code_3: "USA" },
];

pub const CITIES: &[City] = &[
    City {
        id: "1835848",
        name: "Seoul",
        country_code: "KR",
        latitude: "37.566",
        longitude: "126.9784",
        timezone: "Asia/Seoul",
    },
    City {
        id: "1838524",
        name: "Busan",
        country_code: "KR",
        latitude: "35.1028",
        longitude: "129.0403",
        timezone: "Asia/Seoul",
    },
    City {
        id: "1850147",
        name: "Tokyo",
        country_code: "JP",
        latitude: "35.6895",
        longitude: "139.6917",
        timezone: "Asia/Tokyo",
    },
];

pub fn country_by_code3(code3: &str) -> Option<Country> {
    COUNTRIES.iter().find(|c| c.code_3.eq_ignore_ascii_case(code3)).cloned()
}

pub fn cities_of(country_code: &str) -> Vec<City> {
    CITIES
        .iter()
        .filter(|c| c.country_code.eq_ignore_ascii_case(country_code))
        .cloned()
        .collect()
}

pub fn city_by_id(id: &str) -> Option<City> {
    CITIES.iter().find(|c| c.id == id).cloned()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCode {
    pub country_code: String,
}

pub async fn countries() -> Json<Data<&'static [Country]>> {
    data(COUNTRIES)
}

pub async fn cities(query: Result<Query<CountryCode>, QueryRejection>) -> Result<Json<Data<Vec<City>>>, AppError> {
    let Query(query) = query?;
    Ok(data(cities_of(&query.country_code)))
}

pub async fn html(Path(term): Path<String>) -> Result<Html<String>, AppError> {
    let title = match term.as_str() {
        "term-of-service" => "Terms of Service",
        "privacy-policy" => "Privacy Policy",
        _ => return Err(AppError::NotFound(format!("Cannot GET /api/v1/common/html/{term}"))),
    };
    Ok(Html(format!("<html><body><h1>{title}</h1></body></html>")))
}
