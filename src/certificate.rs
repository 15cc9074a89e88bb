use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::VerificationConfig;
use crate::models::{Assignment, AssignmentStatus, CertificateData, Course};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CertificateValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Business gate for certificate issuance. All checks run independently
/// and accumulate; a failed check is data, never an error.
pub fn validate_certificate_requirements(
    assignment: &Assignment,
    course: &Course,
    passing_score: u32,
) -> CertificateValidation {
    let mut errors = Vec::new();

    if assignment.status != AssignmentStatus::Completed {
        errors.push("Assignment is not completed".to_string());
    }
    if assignment.progress_pct != 100 {
        errors.push(format!(
            "Progress is {}%, certificates require 100%",
            assignment.progress_pct
        ));
    }
    if let Some(score) = assignment.score {
        if score < passing_score {
            errors.push(format!(
                "Score of {}% is below the minimum passing score of {}%",
                score, passing_score
            ));
        }
    }
    if !course.active {
        errors.push("Course is not active".to_string());
    }

    CertificateValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Completion,
    Achievement,
    Participation,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    Landscape,
    Portrait,
}

/// One positioned line of text on the certificate. `text` may carry
/// `{placeholder}` tokens that are substituted at render time.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub text: String,
    pub top_pct: u32,
    pub font_size: u32,
    pub bold: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CertificateTemplate {
    pub kind: TemplateKind,
    pub layout: PageLayout,
    pub border_color: String,
    pub accent_color: String,
    pub show_logo: bool,
    pub show_signature: bool,
    pub fields: Vec<TemplateField>,
}

fn field(text: &str, top_pct: u32, font_size: u32, bold: bool) -> TemplateField {
    TemplateField {
        text: text.to_string(),
        top_pct,
        font_size,
        bold,
    }
}

impl CertificateTemplate {
    /// The closed set of shipped templates. Variants are configuration,
    /// not behavior: rendering treats them all identically.
    pub fn for_kind(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::Completion => Self {
                kind,
                layout: PageLayout::Landscape,
                border_color: "#1f3a5f".to_string(),
                accent_color: "#c9a227".to_string(),
                show_logo: true,
                show_signature: true,
                fields: vec![
                    field("Certificate of Completion", 18, 42, true),
                    field("This certifies that", 32, 18, false),
                    field("{learner_name}", 40, 34, true),
                    field("has successfully completed the course", 52, 18, false),
                    field("{course_name}", 60, 28, true),
                    field("on {completion_date}", 72, 16, false),
                ],
            },
            TemplateKind::Achievement => Self {
                kind,
                layout: PageLayout::Landscape,
                border_color: "#4a1f5f".to_string(),
                accent_color: "#b08d2f".to_string(),
                show_logo: true,
                show_signature: true,
                fields: vec![
                    field("Certificate of Achievement", 18, 42, true),
                    field("Awarded to", 32, 18, false),
                    field("{learner_name}", 40, 34, true),
                    field(
                        "for outstanding achievement in {course_name}",
                        54,
                        20,
                        false,
                    ),
                    field("with a score of {score}%", 64, 18, false),
                    field("on {completion_date}", 74, 16, false),
                ],
            },
            TemplateKind::Participation => Self {
                kind,
                layout: PageLayout::Portrait,
                border_color: "#2f5f3a".to_string(),
                accent_color: "#8a8a8a".to_string(),
                show_logo: false,
                show_signature: true,
                fields: vec![
                    field("Certificate of Participation", 20, 36, true),
                    field("{learner_name}", 38, 30, true),
                    field("participated in {course_name}", 52, 18, false),
                    field("{organization_name}", 64, 16, false),
                    field("on {completion_date}", 74, 14, false),
                ],
            },
        }
    }

    pub fn default_template() -> Self {
        Self::for_kind(TemplateKind::Completion)
    }
}

fn long_date(data: &CertificateData) -> String {
    data.completion_date.format("%B %-d, %Y").to_string()
}

fn substitute(text: &str, data: &CertificateData) -> String {
    text.replace("{learner_name}", &data.learner_name)
        .replace("{course_name}", &data.course_name)
        .replace("{completion_date}", &long_date(data))
        .replace(
            "{score}",
            &data.score.map(|s| s.to_string()).unwrap_or_default(),
        )
        .replace(
            "{instructor_name}",
            data.instructor_name.as_deref().unwrap_or(""),
        )
        .replace(
            "{organization_name}",
            data.organization_name.as_deref().unwrap_or(""),
        )
        .replace(
            "{certificate_id}",
            data.certificate_id.as_deref().unwrap_or(""),
        )
}

/// Render a self-contained, print-ready HTML certificate. Pure string
/// output; the caller decides where it goes.
pub fn generate_html(data: &CertificateData, template: &CertificateTemplate) -> String {
    let (width, height) = match template.layout {
        PageLayout::Landscape => (1122, 793),
        PageLayout::Portrait => (793, 1122),
    };

    let mut body = String::new();
    for f in &template.fields {
        let weight = if f.bold { "bold" } else { "normal" };
        body.push_str(&format!(
            "    <div class=\"field\" style=\"top:{}%;font-size:{}px;font-weight:{}\">{}</div>\n",
            f.top_pct,
            f.font_size,
            weight,
            substitute(&f.text, data)
        ));
    }

    let logo = if template.show_logo {
        format!(
            "    <div class=\"logo\">{}</div>\n",
            data.organization_name.as_deref().unwrap_or("LearnPath")
        )
    } else {
        String::new()
    };

    let signature = if template.show_signature {
        format!(
            "    <div class=\"signature\"><span class=\"sig-line\"></span><br/>{}</div>\n",
            data.instructor_name.as_deref().unwrap_or("Course Instructor")
        )
    } else {
        String::new()
    };

    let footer = data
        .certificate_id
        .as_deref()
        .map(|id| format!("    <div class=\"cert-id\">Certificate ID: {}</div>\n", id))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset='utf-8'/>
  <title>Certificate - {course}</title>
  <style>
    @page {{ size: {width}px {height}px; margin: 0 }}
    html,body{{margin:0;padding:0;font-family:Georgia,'Times New Roman',serif}}
    .page{{position:relative;width:{width}px;height:{height}px;background:#fdfcf7;overflow:hidden}}
    .frame{{position:absolute;top:24px;left:24px;right:24px;bottom:24px;border:3px double {border};}}
    .inner{{position:absolute;top:32px;left:32px;right:32px;bottom:32px;border:1px solid {accent};}}
    .field{{position:absolute;left:0;right:0;text-align:center;color:#22262e}}
    .logo{{position:absolute;top:4%;left:0;right:0;text-align:center;font-size:14px;letter-spacing:3px;text-transform:uppercase;color:{accent}}}
    .signature{{position:absolute;bottom:9%;left:10%;font-size:14px;text-align:center}}
    .sig-line{{display:inline-block;width:180px;border-bottom:1px solid #22262e}}
    .cert-id{{position:absolute;bottom:3%;left:0;right:0;text-align:center;font-size:10px;color:#777}}
    .qr{{position:absolute;bottom:7%;right:7%;width:84px;height:84px;border:1px solid #999;font-size:9px;color:#999;display:flex;align-items:center;justify-content:center}}
  </style>
</head>
<body>
  <div class="page">
    <div class="frame"></div>
    <div class="inner"></div>
{logo}{body}{signature}{footer}    <div class="qr">QR</div>
  </div>
</body>
</html>"#,
        course = data.course_name,
        width = width,
        height = height,
        border = template.border_color,
        accent = template.accent_color,
        logo = logo,
        body = body,
        signature = signature,
        footer = footer,
    )
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `CERT-<base36 millis>-<6 random base36 chars>`, uppercased. Best-effort
/// identifier only; global uniqueness is the storage layer's concern.
pub fn generate_certificate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("CERT-{}-{}", to_base36(millis), suffix).to_uppercase()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerificationData {
    pub certificate_id: String,
    pub verification_url: String,
    pub qr_code_data: String,
}

/// Verification metadata for a certificate: a stable id, an absolute
/// verification URL built from the injected base URL, and the JSON blob a
/// QR renderer encodes.
pub fn generate_verification_data(
    data: &CertificateData,
    config: &VerificationConfig,
) -> VerificationData {
    let certificate_id = data
        .certificate_id
        .clone()
        .unwrap_or_else(generate_certificate_id);
    let verification_url = config.verification_url(&certificate_id);

    let qr_code_data = serde_json::json!({
        "certificateId": certificate_id,
        "learner": data.learner_name,
        "course": data.course_name,
        "completionDate": data.completion_date.to_rfc3339(),
        "verificationUrl": verification_url,
    })
    .to_string();

    VerificationData {
        certificate_id,
        verification_url,
        qr_code_data,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ShareableData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub metadata: HashMap<String, String>,
}

/// Social/share payload for a certificate. Pure string composition, no
/// network involvement.
pub fn create_shareable_data(data: &CertificateData, config: &VerificationConfig) -> ShareableData {
    let verification = generate_verification_data(data, config);

    let mut metadata = HashMap::new();
    metadata.insert("learner".to_string(), data.learner_name.clone());
    metadata.insert("course".to_string(), data.course_name.clone());
    metadata.insert("completionDate".to_string(), long_date(data));
    metadata.insert(
        "certificateId".to_string(),
        verification.certificate_id.clone(),
    );
    if let Some(score) = data.score {
        metadata.insert("score".to_string(), score.to_string());
    }

    ShareableData {
        title: format!("Certificate of Completion: {}", data.course_name),
        description: format!(
            "{} completed the course \"{}\" on {}.",
            data.learner_name,
            data.course_name,
            long_date(data)
        ),
        url: verification.verification_url,
        metadata,
    }
}
