// Shared prompt fragments. Each module that builds prompts keeps its own
// prompts.rs; only cross-cutting text lives here.

/// System prompt that pins output to a single YAML document.
pub const YAML_ONLY_SYSTEM: &str = "You are a precise document editor. \
    You MUST respond with a single valid YAML document only. \
    Do NOT include explanations, apologies, or any text outside the YAML. \
    Preserve the keys and structure of the document you are given.";

/// Writing-style policy appended to every tailoring prompt.
/// This is instruction text for the model; nothing checks it afterwards.
pub const STYLE_POLICY: &str = "\
    STYLE RULES:
    - Do NOT use stock adjectives such as 'passionate', 'dynamic', 'results-driven', \
    'innovative', 'hardworking', 'detail-oriented' or 'synergy'.
    - Do NOT use emojis.
    - Use **bold** emphasis sparingly: at most one bolded phrase per entry and never whole sentences.
    - Prefer concrete facts, tools and outcomes already present in the source document.
    - Never invent employers, dates, degrees or metrics.";
