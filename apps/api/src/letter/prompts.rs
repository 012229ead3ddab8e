// All prompt constants for letter composition. Assembly is template
// interpolation only — every placeholder is replaced before sending, and
// the composer owns which values go in.

/// System prompt for cover letter generation.
pub const LETTER_SYSTEM: &str = "You are a professional cover letter writer. \
    You write engaging, customized business letters grounded strictly in \
    the applicant's resume. You respond with the letter text only — no \
    commentary, no markdown fences, no notes.";

/// Letter prompt template. Replace: {date}, {name}, {email}, {phone},
/// {resume_text}, {job_title}, {company}, {job_description},
/// {job_requirements}, {language}, {word_count}, {greeting_target}.
pub const LETTER_PROMPT_TEMPLATE: &str = r#"Create an engaging, professional, and customized cover letter using the following.

Date: {date}

Applicant:
- Name: {name}
- Email: {email}
- Phone: {phone}

Resume (analyze for achievements, skills, and experiences):
{resume_text}

Job:
- Position: {job_title}
- Company: {company}
- Description: {job_description}
- Requirements: {job_requirements}

Instructions:
- Language: write the letter in {language}.
- Length: target approximately {word_count} words (plus or minus 15%).
- Address the letter to {greeting_target}.

Structure and tone:
1. Header: the applicant's contact details, the date, and the recipient/company.
2. Salutation: use the specific name when one is given, otherwise "Dear Hiring Manager".
3. Introduction: enthusiasm and suitability for the role.
4. Body: match the top 2-3 job requirements with real achievements and skills from the resume, and state the value the applicant brings to {company}.
5. Motivation: optionally, why the applicant wants to work at {company}.
6. Closing: reaffirm interest and politely invite follow-up.
7. Signature: the applicant's full name.

Hard rules:
1. Do not include placeholder text in square brackets such as [Your Name] or [Date]; use the actual information provided above.
2. Do not invent information that is not present in the resume.
3. Avoid generic claims the resume cannot support.
4. Quantify achievements wherever the resume supports it.
5. Do not include any physical address or an instruction to fill one in.
6. Avoid copying the resume; synthesize a flowing, impactful letter ready for immediate use."#;
