//! Narrative-generation service trait and request payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::Result;
use crate::insight::InsightCategory;
use crate::types::{StatementType, Symbol};

/// Context for generating one category's narrative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Statement the figures come from.
    pub statement_type: StatementType,
    /// Category to write about.
    pub category: InsightCategory,
    /// What the narrative should assess.
    pub focus: String,
    /// Relevant metrics and raw figures as JSON.
    pub context: serde_json::Value,
}

impl NarrativeRequest {
    /// Renders the request as prompt text for a language model.
    #[must_use]
    pub fn prompt(&self) -> String {
        let context = serde_json::to_string_pretty(&self.context)
            .unwrap_or_else(|_| self.context.to_string());
        format!(
            "Company: {symbol}\nStatement: {statement}\nInsight: {title}\n\n{focus}\n\n\
             Figures (ratios are fractions, amounts are in reporting currency, \
             null means not reported):\n{context}",
            symbol = self.symbol,
            statement = self.statement_type.title(),
            title = self.category.title(),
            focus = self.focus,
        )
    }
}

/// A service that turns financial context into narrative text.
///
/// Implementations own their credentials. A call either returns non-empty
/// text or an error; callers treat errors as "this category is unavailable".
#[async_trait]
pub trait NarrativeService: Send + Sync + Debug {
    /// Returns the name of this service.
    fn name(&self) -> &str;

    /// Generates narrative text for one insight category.
    async fn generate(&self, request: &NarrativeRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_includes_context() {
        let request = NarrativeRequest {
            symbol: Symbol::new("tsla"),
            statement_type: StatementType::IncomeStatement,
            category: InsightCategory::RevenueHealth,
            focus: "Assess revenue growth.".to_string(),
            context: json!({ "metrics": { "gross_profit_margin": 0.18 } }),
        };

        let prompt = request.prompt();
        assert!(prompt.contains("Company: TSLA"));
        assert!(prompt.contains("Insight: Revenue Health"));
        assert!(prompt.contains("Assess revenue growth."));
        assert!(prompt.contains("gross_profit_margin"));
    }
}
