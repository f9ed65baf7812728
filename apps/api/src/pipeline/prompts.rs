// All LLM prompt constants for the built-in pipelines.
// JSON-only instructions are appended by llm_client when json_mode is set.

// ────────────────────────────────────────────────────────────────────────────
// strategic_resume
// ────────────────────────────────────────────────────────────────────────────

pub const RESUME_STRATEGIST_SYSTEM: &str =
    "You are an expert resume strategist. You tailor a candidate's real history \
    to a specific job description. You never invent employers, dates, titles or skills.";

pub const EXPERIENCE_PROMPT_TEMPLATE: &str = r#"Select and rewrite the work experience from the resume that best supports the job description.

Return this exact structure:
{"experiences": [{"id": "exp_1", "company": "Company Name", "position": "Job Title", "startDate": "2020-01", "endDate": "Present", "responsibilities": ["Responsibility 1", "Responsibility 2"]}]}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

pub const SKILLS_PROMPT_TEMPLATE: &str = r#"Extract the skills from the resume that matter most for the job description.
Rate each skill's proficiency from 1 (basic) to 5 (expert).

Return this exact structure:
{"skills": [{"id": "skill_1", "name": "Skill Name", "level": 3}], "additional_skills": ["Basic Skill 1", "Basic Skill 2"]}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

pub const PROJECTS_PROMPT_TEMPLATE: &str = r#"Select the projects from the resume most relevant to the job description.

Return this exact structure:
{"projects": [{"id": "proj_1", "name": "Project Name", "description": "Project description", "url": "https://example.com"}]}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

pub const EDUCATION_PROMPT_TEMPLATE: &str = r#"Extract the candidate's education from the resume.

Return this exact structure:
{"education": [{"id": "edu_1", "institution": "University", "degree": "B.Sc. Computer Science", "startDate": "2014-09", "endDate": "2018-06"}]}

RESUME:
{resume_text}"#;

pub const CONTACT_PROMPT_TEMPLATE: &str = r#"Extract the candidate's name and contact details from the resume. Omit anything not present.

Return this exact structure:
{"name": "Full Name", "contact_info": [{"email": "", "phone": "", "linkedin": "", "github": "", "website": "", "location": ""}]}

RESUME:
{resume_text}"#;

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Write a compelling 2-4 sentence professional summary positioning the candidate for this role.
Ground every claim in the resume and in the sections already selected below.

Return this exact structure:
{"summary": "your complete summary text here"}

SELECTED SECTIONS:
{prior_outputs}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

// ────────────────────────────────────────────────────────────────────────────
// cover_letter
// ────────────────────────────────────────────────────────────────────────────

pub const COVER_LETTER_ANALYST_SYSTEM: &str =
    "You are a hiring strategist. You map a candidate's experience to what a role \
    actually needs and decide how a cover letter should argue the fit.";

pub const COVER_LETTER_ANALYST_PROMPT_TEMPLATE: &str = r#"Analyse the fit between the resume and the job description.

Return this exact structure:
{"key_requirements": ["..."], "matching_experience": ["..."], "company_insights": ["..."], "narrative": "one paragraph on how the letter should argue the fit", "recommended_tone": "professional"}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

ADDITIONAL INSTRUCTIONS FROM THE CANDIDATE:
{user_prompt}"#;

pub const COVER_LETTER_WRITER_SYSTEM: &str =
    "You are an expert cover letter writer. You write specific, evidence-backed letters \
    without clichés.";

pub const COVER_LETTER_WRITER_PROMPT_TEMPLATE: &str = r#"Write a cover letter draft following the analysis below.

Return this exact structure:
{"opening_paragraph": "...", "body_paragraphs": ["...", "..."], "company_connection": "...", "closing_paragraph": "...", "tone": "professional"}

ANALYSIS:
{prior_outputs}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

ADDITIONAL INSTRUCTIONS FROM THE CANDIDATE:
{user_prompt}"#;

pub const COVER_LETTER_EDITOR_SYSTEM: &str =
    "You are an expert cover letter editor with deep knowledge of ATS systems and \
    hiring practices.";

pub const COVER_LETTER_EDITOR_PROMPT_TEMPLATE: &str = r#"Polish the draft below for clarity, tone and ATS-friendliness.
Keep every claim backed by the resume. Aim for 250-450 words in total.
Estimate an ATS compatibility score from 1 to 10.

Return this exact structure:
{"opening_paragraph": "...", "body_paragraphs": ["..."], "company_connection": "...", "closing_paragraph": "...", "tone": "professional", "word_count": 320, "ats_score": 8}

ANALYSIS AND DRAFT:
{prior_outputs}

RESUME:
{resume_text}"#;

// ────────────────────────────────────────────────────────────────────────────
// theme_package
// ────────────────────────────────────────────────────────────────────────────

pub const THEME_ANALYST_SYSTEM: &str =
    "You are a senior creative director producing design briefs for resume and \
    cover letter themes.";

pub const THEME_ANALYST_PROMPT_TEMPLATE: &str = r##"Produce a design brief for this request:
{user_prompt}

Return this exact structure:
{"name": "Monaco Professional", "description": "layout and aesthetic", "color_palette": [{"role": "primary", "hex_code": "#1A1A2E"}], "google_fonts": ["Lato"], "resume_direction": "2-8 sentences", "cover_letter_direction": "2-8 sentences"}"##;

pub const THEME_DEVELOPER_SYSTEM: &str =
    "You are a template developer. You write standard Jinja2 templates and plain CSS.";

pub const RESUME_THEME_PROMPT_TEMPLATE: &str = r#"Build a resume template from the design brief below.
The template must expect a single variable `resume` with fields name, summary, experiences, skills, projects, education and contact_info.
Include Google Fonts via @import if the brief names any.

Return this exact structure:
{"template": "<complete Jinja2 template>", "styles": "<complete CSS>"}

DESIGN BRIEF:
{prior_outputs}"#;

pub const COVER_LETTER_THEME_PROMPT_TEMPLATE: &str = r#"Build a cover letter template from the design brief below.
The template must expect a single variable `cover_letter` with fields opening_paragraph, body_paragraphs, company_connection and closing_paragraph.
Include Google Fonts via @import if the brief names any.

Return this exact structure:
{"template": "<complete Jinja2 template>", "styles": "<complete CSS>"}

DESIGN BRIEF:
{prior_outputs}"#;
