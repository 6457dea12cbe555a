use rivalwatch_common::types::Company;

/// 拼接列表，空列表时返回占位文本
fn join_or(items: &[String], fallback: &str) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn description_of(company: &Company) -> &str {
    company
        .headline
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("Not available")
}

/// 构建竞争格局分析 prompt
pub fn build_landscape_prompt(company: &Company, competitors: &[String]) -> String {
    LANDSCAPE_PROMPT
        .replace("{{COMPANY_NAME}}", &company.name)
        .replace("{{DESCRIPTION}}", description_of(company))
        .replace("{{INDUSTRIES}}", &join_or(&company.industries, "Not specified"))
        .replace("{{COMPETITORS}}", &join_or(competitors, "None identified"))
}

/// 构建市场定位分析 prompt（要求模型只返回 JSON）
pub fn build_positioning_prompt(company: &Company, competitors: &[String]) -> String {
    POSITIONING_PROMPT
        .replace("{{COMPANY_NAME}}", &company.name)
        .replace("{{DESCRIPTION}}", description_of(company))
        .replace("{{INDUSTRIES}}", &join_or(&company.industries, "Not specified"))
        .replace("{{COMPETITORS}}", &join_or(competitors, "None identified"))
}

const LANDSCAPE_PROMPT: &str = r#"Generate a short, factual competitive landscape summary for the company '{{COMPANY_NAME}}'.
Base your answer ONLY on the data below.

Company description: {{DESCRIPTION}}
Industries: {{INDUSTRIES}}
Known competitors: {{COMPETITORS}}

Please produce 5-7 sentences explaining:
- the type of market the company operates in
- its positioning relative to the listed competitors
- the main competitive pressures
- how it differentiates itself
- risks or strategic considerations

Keep the tone clear, analytical, crisp, and business-focused."#;

const POSITIONING_PROMPT: &str = r#"You are an expert in market positioning and strategic analysis.
Return ONLY valid JSON with these keys:
- value_proposition
- competitive_edge
- brand_perception
- key_segments
- weaknesses
- opportunity_areas
- summary

Each key contains 2-4 sentences of analytical, precise text.

Input:
Company name: {{COMPANY_NAME}}
Description: {{DESCRIPTION}}
Industries: {{INDUSTRIES}}
Competitors: {{COMPETITORS}}

Your output MUST be pure JSON. No markdown, no code blocks."#;
