// Prompt templates for the tailoring pipeline.
// Placeholders are filled in a single pass by `fill_prompt`.

/// Résumé tailoring prompt.
/// Replace: {job_ad}, {template_yaml}, {style_policy}
pub const CV_PROMPT_TEMPLATE: &str = r#"You are a professional CV tailoring expert. Given the following job advertisement and the candidate's base CV, tailor the CV to better match the job requirements.

Job Advertisement:
{job_ad}

Base CV (YAML format):
{template_yaml}

Instructions:
1. Keep all the original information (education, experience, skills, etc.)
2. Modify the summary section to highlight relevant experience for this job
3. Reorder or emphasize relevant skills and experiences
4. Adjust highlights in experience entries to better match job requirements
5. Keep the YAML structure intact, including the settings block
6. Return ONLY the modified YAML, no explanations

{style_policy}

Return the tailored CV in YAML format:"#;

/// Cover letter prompt.
/// Replace: {job_ad}, {template_yaml}, {tailored_cv_yaml}, {style_policy}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are a professional cover letter writer. Given the following job advertisement, the candidate's base cover letter template and the CV already tailored for this job, write a tailored cover letter.

Job Advertisement:
{job_ad}

Base Cover Letter Template (YAML format):
{template_yaml}

Tailored CV for this job (YAML format, use it as the source of the candidate's experience):
{tailored_cv_yaml}

Instructions:
1. Extract the position title, company name, and key requirements from the job ad
2. Replace placeholders like [Recipient Name], [Company Name], [Position Title] with appropriate values
3. Leave the [Date] placeholder exactly as written
4. Write compelling paragraphs that connect the candidate's experience to the job requirements
5. Keep the professional tone
6. Maintain the YAML structure with the sections field and the settings block
7. Return ONLY the modified YAML, no explanations

{style_policy}

Return the tailored cover letter in YAML format:"#;

/// Replaces each `{key}` in `template` with its value. Inserted text is never
/// scanned again, so braces inside the job ad or generated YAML stay literal.
/// Unknown placeholders are left as written.
pub fn fill_prompt(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find(|(key, _)| {
            tail.strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
