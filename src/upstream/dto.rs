//! DTOs for decoding collaborator JSON responses.

use serde::Deserialize;

/// Body returned by the postal-code lookup service.
///
/// Unknown codes come back as 200 with `"erro": true` (older API revisions)
/// or `"erro": "true"` (newer ones).
#[derive(Debug, Deserialize)]
pub(super) struct CepResponseDto {
    #[serde(default)]
    pub(super) localidade: String,
    #[serde(default)]
    pub(super) erro: Option<ErroFlag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ErroFlag {
    Bool(bool),
    Text(String),
}

impl ErroFlag {
    fn is_set(&self) -> bool {
        match self {
            ErroFlag::Bool(flag) => *flag,
            ErroFlag::Text(text) => text.eq_ignore_ascii_case("true"),
        }
    }
}

impl CepResponseDto {
    /// The resolved place, or `None` for a semantic miss.
    pub(super) fn into_place(self) -> Option<String> {
        let not_found = self.erro.as_ref().is_some_and(ErroFlag::is_set);
        if not_found || self.localidade.is_empty() {
            None
        } else {
            Some(self.localidade)
        }
    }
}

/// Body returned by the weather service's `current.json`.
#[derive(Debug, Deserialize)]
pub(super) struct WeatherResponseDto {
    pub(super) current: CurrentConditionsDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct CurrentConditionsDto {
    pub(super) temp_c: f64,
}
