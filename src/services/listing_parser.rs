// src/services/listing_parser.rs
//
// Integração com o modelo de linguagem externo: transforma o texto livre de um
// anúncio num rascunho de veículo para o formulário do admin.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{common::error::AppError, config::ListingParserConfig, models::vehicle::VehicleDraft};

const SYSTEM_PROMPT: &str = "Extraia os dados do anúncio de veículo a seguir. \
Responda SOMENTE com um objeto JSON com as chaves: make, model, year (inteiro), \
price (número), mileage (inteiro, km), fuelType, transmission, bodyType, color, \
description. Use null para o que não estiver no texto.";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    content: String,
}

#[derive(Clone)]
pub struct ListingParser {
    http: reqwest::Client,
    config: Option<ListingParserConfig>,
}

impl ListingParser {
    pub fn new(config: Option<ListingParserConfig>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    pub async fn parse(&self, text: &str) -> Result<VehicleDraft, AppError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| anyhow!("parser de anúncios não configurado (LISTING_PARSER_URL/LISTING_PARSER_API_KEY)"))?;

        let body = json!({
            "model": config.model,
            "temperature": 0,
            "messages": [
                ChatMessage { role: "system".into(), content: SYSTEM_PROMPT.into() },
                ChatMessage { role: "user".into(), content: text.to_string() },
            ],
        });

        let completion = self
            .http
            .post(&config.url)
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await
            .context("Falha ao chamar o parser de anúncios")?
            .error_for_status()
            .context("Parser de anúncios retornou erro")?
            .json::<ChatCompletion>()
            .await
            .context("Resposta do parser de anúncios em formato inesperado")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("Parser de anúncios não retornou nenhuma escolha"))?;

        let draft = draft_from_reply(&content)?;
        tracing::info!(
            "🤖 Anúncio interpretado: {} {}",
            draft.make.as_deref().unwrap_or("?"),
            draft.model.as_deref().unwrap_or("?")
        );
        Ok(draft)
    }
}

/// Recorta o objeto JSON da resposta do modelo (tolera cercas ```json).
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

pub fn draft_from_reply(reply: &str) -> Result<VehicleDraft, AppError> {
    let object = extract_json_object(reply)
        .ok_or_else(|| anyhow!("Resposta do parser sem objeto JSON: {}", reply))?;

    let draft = serde_json::from_str::<VehicleDraft>(object)
        .context("Objeto JSON do parser não corresponde a um veículo")?;
    Ok(draft)
}
