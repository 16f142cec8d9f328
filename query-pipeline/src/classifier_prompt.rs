use serde_json::{json, Value};

use crate::context::CategoryContext;

pub static CLASSIFIER_SYSTEM_PROMPT: &str = "You are a product categorization expert. \
Analyze search queries and retrieved product context to extract structured search \
parameters and determine the most relevant product category. Respond with a single \
JSON object and nothing else.";

/// Builds the enriched user message: the original query plus the per-category
/// product samples, followed by the conservative decision rules the model
/// must apply.
pub fn build_classification_message(query: &str, context: &CategoryContext) -> String {
    let context_block = serde_json::to_string_pretty(&context.to_json())
        .unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Given the user search query and the top product categories with sample products, extract search parameters AND classify the category.

**User Query**: "{query}"

**Top Categories with Sample Products**:
{context_block}

**Task**:
1. Analyze the query intent and the retrieved product context
2. Classify the most relevant category (be CONSERVATIVE - see rules below)
3. Extract filters (price, stock, special_price only - follow the filter rules)
4. Build the search query (q field with product type, attributes, descriptors, singular form)
5. Determine sort order (if applicable; empty string for default relevance)

**Decision Criteria**:
- **Exact match** (SKU or exact product name): very high confidence (0.9-1.0)
- **Clear product type** (e.g. "nitrile gloves" -> Gloves): high confidence (0.7-0.9)
- **Product type + attributes** (e.g. "blue nitrile gloves"): high confidence (0.7-0.9)
- **Brand + product type** (e.g. "Thermo Fisher pipettes"): medium-high confidence (0.6-0.85)
- **Ambiguous or attribute-only**: low confidence (0.0-0.5) -> return null

**CRITICAL RULES - return null for detected_category and confidence below 0.5 if**:
1. **Single attribute word without a product type**:
   - Examples: "clear", "large", "medium", "blue", "sterile", "disposable"
   - These are attributes (color, size, property), NOT product types
   - Rule: if the query is 1-2 words AND does not mention a specific product type, return null
2. **Brand name only without a product type**:
   - Brands span many categories, too ambiguous to filter
   - Rule: if the query is only a brand name, return null
3. **Generic attribute categories**:
   - Category labels like "Brand: X", "Size: X", "Color: X" are attribute buckets, not product categories
   - Rule: never return a category whose name starts with "Brand:", "Size:" or "Color:"
4. **Highly ambiguous product types**:
   - Example: "filters" (could be water, air, syringe, etc.)
   - Rule: if 3 or more categories match equally well, return null

**Conservative Filter Rules**:
- DO NOT extract color/size/brand as filters (keep them in "q" for semantic search)
- ALWAYS extract price when mentioned (exact: price:=X, bounds: price:<X or price:>X)
- ALWAYS extract stock when mentioned (stock_status:=IN_STOCK)
- ALWAYS extract special_price for "on sale" (special_price:>0)
- NEVER put a categories clause in filter_by; report the category only in detected_category

**Response Format** (JSON only - no markdown, no code fences):
{{
    "q": "search terms in singular form",
    "filter_by": "price/stock/special_price clauses joined with &&, empty when none",
    "sort_by": "field:direction or empty",
    "per_page": 20,
    "detected_category": "Full/Category/Path" or null,
    "category_confidence": 0.85,
    "category_reasoning": "Why this category was chosen (or why null)"
}}

Be CONSERVATIVE with category detection - null is better than a wrong category.

**Examples**:

Query: "clear"
-> {{"q": "clear", "filter_by": "", "sort_by": "", "per_page": 20, "detected_category": null, "category_confidence": 0.2, "category_reasoning": "Single attribute word without product type"}}

Query: "Mercedes Scientific"
-> {{"q": "Mercedes Scientific", "filter_by": "", "sort_by": "", "per_page": 20, "detected_category": null, "category_confidence": 0.3, "category_reasoning": "Brand only, spans many categories"}}

Query: "nitrile gloves under $50"
-> {{"q": "nitrile glove", "filter_by": "price:<50", "sort_by": "", "per_page": 20, "detected_category": "Products/Gloves & Apparel/Gloves", "category_confidence": 0.85, "category_reasoning": "Clear product type match with price filter"}}

Query: "Centrifuge tubes, 50ml capacity"
-> {{"q": "centrifuge tube 50ml", "filter_by": "", "sort_by": "", "per_page": 20, "detected_category": "Products/Lab Plasticware/Centrifuge Tubes", "category_confidence": 0.9, "category_reasoning": "Specific product type with capacity specification"}}"#
    )
}

/// Strict response schema for the classification call. Field names are the
/// wire contract shared with the decoupled relay deployment.
pub fn classification_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "q": {
                "type": "string",
                "description": "Rewritten search terms in singular form"
            },
            "filter_by": {
                "type": "string",
                "description": "price/stock/special_price clauses joined with ' && ', empty when none"
            },
            "sort_by": {
                "type": "string",
                "description": "field:direction, empty for the default relevance sort"
            },
            "per_page": {
                "type": "integer",
                "description": "Requested page size"
            },
            "detected_category": {
                "type": ["string", "null"],
                "description": "Full category path, or null when uncertain"
            },
            "category_confidence": {
                "type": "number",
                "description": "Confidence in the detected category, 0.0 to 1.0"
            },
            "category_reasoning": {
                "type": "string",
                "description": "Why the category was chosen, or why null was returned"
            }
        },
        "required": [
            "q",
            "filter_by",
            "sort_by",
            "per_page",
            "detected_category",
            "category_confidence",
            "category_reasoning"
        ],
        "additionalProperties": false
    })
}
