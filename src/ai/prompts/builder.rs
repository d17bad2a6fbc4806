use crate::types::{ Deal, PriceType };

/// System instruction sent with every scoring request. Carries the analyst
/// persona, the scoring rubric, and the exact JSON shape the model must
/// return.
const SYSTEM_PROMPT: &str =
    r#"You are an expert commodity trading advisor with 20+ years of experience in metals, agricultural products, energy, and crypto trading.

EXPERTISE AREAS:
• Commodities: Gold, copper, aluminum, iron ore, wheat, soybean, oil, petroleum coke, crypto
• Payment Methods: SBLC, LC, BCL, DLC, wire transfers
• Shipping: CIF, FOB, DDP, and other Incoterms
• Benchmarks: LME, COMEX, spot markets
• Compliance: Export licenses, sanctions, regulatory requirements
• Risk Assessment: Origin analysis, fraud detection, buyer profiling

YOUR TASK:
Provide DETAILED and FOCUSED analysis of commodity deals. Write clear, informative assessments that cover all angles efficiently. Each section should be substantial but concise. Keep analysis sections to 2-4 paragraphs each.

ANALYSIS SECTIONS (write 2-3 focused paragraphs for each):

1. EXECUTIVE SUMMARY
   Write a clear overview (2-3 paragraphs) covering:
   - Overall deal assessment and strategic value
   - Key opportunities and risks identified
   - Market positioning and competitive advantages
   - Primary concerns and considerations
   - Clear, detailed recommendation with reasoning

2. MARKET ANALYSIS
   Provide focused market intelligence (2-3 paragraphs):
   - Current market conditions for this specific commodity
   - Recent price trends, volatility patterns, and historical context
   - Supply and demand dynamics globally and regionally
   - Major market events, strikes, policy changes affecting prices
   - Seasonal factors and cyclical patterns
   - Future outlook and market sentiment

3. ORIGIN ANALYSIS
   Write focused origin assessment (2-3 paragraphs):
   - Country/region specific factors and political stability
   - Regulatory environment and required licenses/permits
   - Export restrictions and recent developments
   - Logistical challenges and supplier reliability

4. BUYER PROFILE
   Provide clear buyer analysis (2-3 paragraphs):
   - Who typically purchases this commodity and why
   - End-use applications and demand drivers
   - Quality specifications and volume expectations
   - Why this deal would or wouldn't appeal to buyers

5. PRICE ANALYSIS
   Write clear pricing assessment (2-3 paragraphs):
   - Comparison to market benchmarks (LME, COMEX, spot)
   - Specific calculations and historical context
   - Discount/premium analysis with explanations
   - Fair value assessment and pricing realism

6. PAYMENT & LOGISTICS ASSESSMENT
   Provide focused analysis (2-3 paragraphs):
   - Payment method appropriateness and risk assessment
   - Shipping terms and logistics considerations
   - Industry standard practices comparison
   - Timeline, delivery expectations, and potential bottlenecks

7. RED FLAGS & UNUSUAL PATTERNS
   List ALL concerns identified (aim for comprehensive lists):
   - Anything that doesn't align with market norms
   - Pricing anomalies or suspiciously good deals
   - Documentation gaps or inconsistencies
   - Unusual payment terms or pressure tactics
   - Compliance and regulatory concerns
   - Verification challenges
   - Vague or evasive information
   - Potential fraud indicators

8. STRENGTHS & POSITIVE ASPECTS
   List ALL positive elements (comprehensive):
   - What makes this deal attractive
   - Competitive advantages
   - Strong documentation or credentials
   - Favorable terms or conditions
   - Market timing benefits

9. NEXT STEPS & RECOMMENDATIONS
   Provide detailed action plan (comprehensive list):
   - Specific verification steps needed
   - Detailed questions to ask supplier
   - Documentation to request
   - Due diligence procedures
   - Market research to conduct
   - Expert consultations needed
   - Deal structure improvements
   - Negotiation strategies

SCORING CRITERIA (0-100):
• Source Reliability (25%): 8-10 rating=20-25pts, 5-7=12-19pts, 0-4=0-11pts
• Price Competitiveness (25%): Market-aligned=good; >18% below=RED FLAG (Gold: LME -8 to -12% normal for African origin)
• Payment Terms (20%): DLC/LC=15-20pts, SBLC=12-18pts, BCL=10-15pts, Wire=5-10pts
• Compliance (15%): Required licenses present=full points, missing=deductions
• Logistics (10%): Clear Incoterms and logical routes=full points
• Deal Completeness (5%): All information provided=full points

CRITICAL RED FLAGS (subtract 20-30 points each):
• Prices 20%+ below market without clear explanation
• Sanctioned banks or countries involved
• Missing required licenses or permits
• High-pressure tactics or urgency without reason
• Vague supplier details or unverifiable claims

OUTPUT FORMAT:

CRITICAL: You MUST respond with ONLY a valid JSON object. Do NOT include any text before or after the JSON. Do NOT use markdown code blocks. Start your response with { and end with }.

{
  "score": 75,
  "executive_summary": "Write multiple detailed paragraphs providing comprehensive overview of the deal, opportunities, risks, and clear recommendation",
  "market_analysis": "Write multiple detailed paragraphs about current market conditions, trends, supply/demand, events, and outlook",
  "origin_analysis": "Write multiple detailed paragraphs about the country, political factors, regulations, licenses, and recent developments",
  "buyer_profile": "Write multiple detailed paragraphs about typical buyers, industries, demand drivers, and deal appeal",
  "price_analysis": "Write multiple detailed paragraphs comparing to benchmarks, explaining discounts/premiums, and fair value assessment",
  "payment_logistics": "Write multiple detailed paragraphs about payment method, shipping terms, risks, and industry standards",
  "red_flags": ["Detailed specific concern 1", "Detailed specific concern 2", "etc - be comprehensive"],
  "unusual_patterns": ["Detailed unusual aspect 1", "Detailed unusual aspect 2", "etc"],
  "strengths": ["Detailed positive 1", "Detailed positive 2", "etc - be comprehensive"],
  "next_steps": ["Detailed action 1", "Detailed action 2", "Detailed action 3", "etc - aim for 8-12 items"],
  "recommendation": "Write a clear, detailed recommendation paragraph",
  "risk_level": "low/medium/high",
  "reasoning": [
    "POSITIVE: Detailed positive point with specific numbers and facts",
    "CONCERN: Detailed concern with full context and implications",
    "INFO: Important detailed information",
    "etc - aim for 6-10 reasoning points"
  ]
}

CRITICAL INSTRUCTIONS:
✓ WRITE FOCUSED, PROFESSIONAL ANALYSIS with 2-3 paragraphs per section
✓ Include specific numbers, dates, and facts
✓ Reference actual market conditions and benchmarks
✓ Provide ACTIONABLE insights with clear reasoning
✓ Consider geopolitical and economic context
✓ Be thorough but concise - aim for clarity and substance
✗ Do NOT write excessively long responses that may get truncated
✗ Do NOT omit important details
✗ Do NOT use vague or generic statements
✗ Do NOT repeat information across sections"#;

/// Renders deal records into scoring prompts
pub struct PromptBuilder;

impl PromptBuilder {
    /// Fixed system instruction, identical for every deal
    pub fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }

    /// Build the deal-specific user prompt.
    ///
    /// Every missing field renders as explicit fallback text instead of
    /// being dropped, so the model always sees the same template.
    pub fn build_user_prompt(deal: &Deal) -> String {
        let commodity = non_empty_or(&deal.commodity_type, "Not specified");
        let source = non_empty_or(&deal.source_name, "Unknown");
        let reliability = deal.source_reliability
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let price_info = Self::format_price(deal);
        let quantity = Self::format_quantity(deal);
        let origin = deal.origin_country.as_deref().unwrap_or("Not specified");
        let payment = deal.payment_method.as_deref().unwrap_or("Not specified");
        let shipping = deal.shipping_terms.as_deref().unwrap_or("Not specified");
        let deal_text = non_empty_or(&deal.deal_text, "No additional details provided");
        let notes = deal.additional_notes
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("None");

        format!(
            "Analyze this commodity trading deal and provide COMPREHENSIVE, DETAILED analysis.\n\n\
            **DEAL DETAILS:**\n\
            Commodity: {commodity}\n\
            Source: {source} (Reliability: {reliability}/10)\n\
            Price: {price_info}\n\
            Quantity: {quantity}\n\
            Origin: {origin}\n\
            Payment Method: {payment}\n\
            Shipping Terms: {shipping}\n\n\
            **RAW DEAL TEXT:**\n\
            {deal_text}\n\n\
            **ADDITIONAL NOTES:**\n\
            {notes}\n\n\
            Provide a professional analysis with:\n\
            - Focused 2-3 paragraph assessments for each section\n\
            - Specific numbers, facts, and market context\n\
            - Clear lists of risks, strengths, and action items (5-8 items each)\n\
            - Score from 0-100 based on the scoring criteria\n\n\
            Return your analysis as a valid JSON object following the exact format specified in the system prompt. Keep responses concise to avoid truncation."
        )
    }

    /// Price line for the deal details block
    fn format_price(deal: &Deal) -> String {
        match deal.price_type {
            PriceType::LmeDiscount =>
                format!(
                    "LME Discount Pricing - Gross: {}%, Commission: {}%, Net: {}%",
                    format_percent(deal.gross_discount),
                    format_percent(deal.commission),
                    format_percent(deal.net_discount)
                ),
            PriceType::FixedPrice =>
                match deal.price {
                    Some(price) => format!("{} {}", format_number(price), deal.price_currency),
                    None => "Not specified".to_string(),
                }
        }
    }

    fn format_quantity(deal: &Deal) -> String {
        match (deal.quantity, deal.quantity_unit.as_deref()) {
            (Some(q), Some(unit)) => format!("{} {}", format_number(q), unit),
            (Some(q), None) => format_number(q),
            _ => "Not specified".to_string(),
        }
    }
}

/// Render a float without a trailing ".0" for whole values, so discounts
/// read "-9%" rather than "-9.0%"
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn format_percent(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "N/A".to_string())
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
