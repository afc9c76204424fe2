//! 求人データの型定義

use serde::{Deserialize, Serialize};
use url::Url;

/// 一覧ページで部署が取れなかったときのプレースホルダ
pub const DEPARTMENT_PLACEHOLDER: &str = "Not specified";

/// 一覧ページから取得した求人の概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub title: String,
    pub link: Url,
    pub department: String,
}

/// 詳細ページから取得する項目（CSVの列順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    ScrapeDate,
    JobTitle,
    ReferenceNumber,
    Department,
    Link,
    Location,
    Salary,
    JobGrade,
    ContractType,
    RoleType,
    WorkingPattern,
    NumberAvailable,
    ClosingDate,
    JobSummary,
    JobDescription,
    PersonSpecification,
    Qualifications,
    Behaviours,
    TechnicalSkills,
    Benefits,
    SelectionProcess,
    ContactName,
    ContactEmail,
    MatchScore,
}

impl JobField {
    pub const ALL: [JobField; 24] = [
        JobField::ScrapeDate,
        JobField::JobTitle,
        JobField::ReferenceNumber,
        JobField::Department,
        JobField::Link,
        JobField::Location,
        JobField::Salary,
        JobField::JobGrade,
        JobField::ContractType,
        JobField::RoleType,
        JobField::WorkingPattern,
        JobField::NumberAvailable,
        JobField::ClosingDate,
        JobField::JobSummary,
        JobField::JobDescription,
        JobField::PersonSpecification,
        JobField::Qualifications,
        JobField::Behaviours,
        JobField::TechnicalSkills,
        JobField::Benefits,
        JobField::SelectionProcess,
        JobField::ContactName,
        JobField::ContactEmail,
        JobField::MatchScore,
    ];

    /// 出力時の列名
    pub fn header(self) -> &'static str {
        match self {
            JobField::ScrapeDate => "Scrape Date",
            JobField::JobTitle => "Job Title",
            JobField::ReferenceNumber => "Reference Number",
            JobField::Department => "Department",
            JobField::Link => "Link",
            JobField::Location => "Location",
            JobField::Salary => "Salary",
            JobField::JobGrade => "Job Grade",
            JobField::ContractType => "Contract Type",
            JobField::RoleType => "Role Type",
            JobField::WorkingPattern => "Working Pattern",
            JobField::NumberAvailable => "Number Available",
            JobField::ClosingDate => "Closing Date",
            JobField::JobSummary => "Job Summary",
            JobField::JobDescription => "Job Description",
            JobField::PersonSpecification => "Person Specification",
            JobField::Qualifications => "Qualifications",
            JobField::Behaviours => "Behaviours",
            JobField::TechnicalSkills => "Technical Skills",
            JobField::Benefits => "Benefits",
            JobField::SelectionProcess => "Selection Process",
            JobField::ContactName => "Contact Name",
            JobField::ContactEmail => "Contact Email",
            JobField::MatchScore => "Match Score",
        }
    }

    pub fn headers() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|f| f.header())
    }
}

/// 詳細ページから組み立てた求人レコード
///
/// 全項目が常に存在し、値が取れなかった項目は `None`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "Scrape Date")]
    pub scrape_date: Option<String>,
    #[serde(rename = "Job Title")]
    pub job_title: Option<String>,
    #[serde(rename = "Reference Number")]
    pub reference_number: Option<String>,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "Link")]
    pub link: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Salary")]
    pub salary: Option<String>,
    #[serde(rename = "Job Grade")]
    pub job_grade: Option<String>,
    #[serde(rename = "Contract Type")]
    pub contract_type: Option<String>,
    #[serde(rename = "Role Type")]
    pub role_type: Option<String>,
    #[serde(rename = "Working Pattern")]
    pub working_pattern: Option<String>,
    #[serde(rename = "Number Available")]
    pub number_available: Option<String>,
    #[serde(rename = "Closing Date")]
    pub closing_date: Option<String>,
    #[serde(rename = "Job Summary")]
    pub job_summary: Option<String>,
    #[serde(rename = "Job Description")]
    pub job_description: Option<String>,
    #[serde(rename = "Person Specification")]
    pub person_specification: Option<String>,
    #[serde(rename = "Qualifications")]
    pub qualifications: Option<String>,
    #[serde(rename = "Behaviours")]
    pub behaviours: Option<String>,
    #[serde(rename = "Technical Skills")]
    pub technical_skills: Option<String>,
    #[serde(rename = "Benefits")]
    pub benefits: Option<String>,
    #[serde(rename = "Selection Process")]
    pub selection_process: Option<String>,
    #[serde(rename = "Contact Name")]
    pub contact_name: Option<String>,
    #[serde(rename = "Contact Email")]
    pub contact_email: Option<String>,
    #[serde(rename = "Match Score")]
    pub match_score: Option<String>,
}

impl JobRecord {
    /// 一覧ページから引き継いだ値で初期化
    pub fn new(scrape_date: String, title: &str, department: &str, link: &Url) -> Self {
        Self {
            scrape_date: Some(scrape_date),
            job_title: normalize_text(title),
            department: normalize_text(department),
            link: Some(link.to_string()),
            ..Default::default()
        }
    }

    fn slot(&mut self, field: JobField) -> &mut Option<String> {
        match field {
            JobField::ScrapeDate => &mut self.scrape_date,
            JobField::JobTitle => &mut self.job_title,
            JobField::ReferenceNumber => &mut self.reference_number,
            JobField::Department => &mut self.department,
            JobField::Link => &mut self.link,
            JobField::Location => &mut self.location,
            JobField::Salary => &mut self.salary,
            JobField::JobGrade => &mut self.job_grade,
            JobField::ContractType => &mut self.contract_type,
            JobField::RoleType => &mut self.role_type,
            JobField::WorkingPattern => &mut self.working_pattern,
            JobField::NumberAvailable => &mut self.number_available,
            JobField::ClosingDate => &mut self.closing_date,
            JobField::JobSummary => &mut self.job_summary,
            JobField::JobDescription => &mut self.job_description,
            JobField::PersonSpecification => &mut self.person_specification,
            JobField::Qualifications => &mut self.qualifications,
            JobField::Behaviours => &mut self.behaviours,
            JobField::TechnicalSkills => &mut self.technical_skills,
            JobField::Benefits => &mut self.benefits,
            JobField::SelectionProcess => &mut self.selection_process,
            JobField::ContactName => &mut self.contact_name,
            JobField::ContactEmail => &mut self.contact_email,
            JobField::MatchScore => &mut self.match_score,
        }
    }

    pub fn get(&self, field: JobField) -> Option<&str> {
        let value = match field {
            JobField::ScrapeDate => &self.scrape_date,
            JobField::JobTitle => &self.job_title,
            JobField::ReferenceNumber => &self.reference_number,
            JobField::Department => &self.department,
            JobField::Link => &self.link,
            JobField::Location => &self.location,
            JobField::Salary => &self.salary,
            JobField::JobGrade => &self.job_grade,
            JobField::ContractType => &self.contract_type,
            JobField::RoleType => &self.role_type,
            JobField::WorkingPattern => &self.working_pattern,
            JobField::NumberAvailable => &self.number_available,
            JobField::ClosingDate => &self.closing_date,
            JobField::JobSummary => &self.job_summary,
            JobField::JobDescription => &self.job_description,
            JobField::PersonSpecification => &self.person_specification,
            JobField::Qualifications => &self.qualifications,
            JobField::Behaviours => &self.behaviours,
            JobField::TechnicalSkills => &self.technical_skills,
            JobField::Benefits => &self.benefits,
            JobField::SelectionProcess => &self.selection_process,
            JobField::ContactName => &self.contact_name,
            JobField::ContactEmail => &self.contact_email,
            JobField::MatchScore => &self.match_score,
        };
        value.as_deref()
    }

    /// 値を正規化して設定（空文字列は None）
    pub fn set(&mut self, field: JobField, value: Option<&str>) {
        *self.slot(field) = value.and_then(normalize_text);
    }

    /// 列順の値一覧
    pub fn values(&self) -> Vec<Option<&str>> {
        JobField::ALL.iter().map(|&f| self.get(f)).collect()
    }

    /// 部署を詳細ページ側の値で補完すべきか
    pub fn needs_department(&self) -> bool {
        match self.department.as_deref() {
            None => true,
            Some(d) => d == DEPARTMENT_PLACEHOLDER,
        }
    }
}

/// 前後の空白を除去し、連続する空白・改行を1つのスペースにまとめる
pub fn normalize_text(raw: &str) -> Option<String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// クロールの終了状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CrawlStatus {
    /// 「次へ」が無くなり正常終了
    Finished,
    /// ページング中の想定外エラーで中断（収集済みレコードは保持）
    Aborted(String),
}

impl CrawlStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, CrawlStatus::Finished)
    }
}

/// クロール結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub status: CrawlStatus,
    /// 処理した一覧ページ数
    pub pages: u32,
    /// 一覧ページで見つかった求人数
    pub summaries_seen: usize,
    /// 詳細ページの読み込みに失敗して捨てた件数
    pub records_dropped: usize,
    pub records: Vec<JobRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_text("  Senior\n\n  Analyst \t(Data)  ").as_deref(),
            Some("Senior Analyst (Data)")
        );
        assert_eq!(normalize_text(" \n\t "), None);
        assert_eq!(normalize_text(""), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "plain",
            "  two   spaces ",
            "line\nbreaks\r\nhere",
            "\u{a0}nbsp\u{a0}and tabs\t",
        ];
        for sample in samples {
            let once = normalize_text(sample).unwrap();
            let twice = normalize_text(&once).unwrap();
            assert_eq!(once, twice);
            assert!(!once.contains('\n'));
            assert!(!once.contains("  "));
        }
    }

    #[test]
    fn test_headers_match_schema_order() {
        let headers: Vec<_> = JobField::headers().collect();
        assert_eq!(headers.len(), 24);
        assert_eq!(headers[0], "Scrape Date");
        assert_eq!(headers[3], "Department");
        assert_eq!(headers[23], "Match Score");
    }

    #[test]
    fn test_serialized_record_has_every_key() {
        let link = Url::parse("https://x/1").unwrap();
        let record = JobRecord::new("2025-04-25".into(), "Analyst", "Finance", &link);
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();

        for header in JobField::headers() {
            assert!(obj.contains_key(header), "missing key {}", header);
        }
        assert_eq!(obj["Match Score"], serde_json::Value::Null);
        assert_eq!(obj["Link"], "https://x/1");
    }

    #[test]
    fn test_set_and_get_roundtrip_normalizes() {
        let mut record = JobRecord::default();
        record.set(JobField::Salary, Some("  £30,000\n - £35,000 "));
        record.set(JobField::Location, Some("   "));
        assert_eq!(record.get(JobField::Salary), Some("£30,000 - £35,000"));
        assert_eq!(record.get(JobField::Location), None);
    }

    #[test]
    fn test_needs_department() {
        let link = Url::parse("https://x/1").unwrap();
        assert!(JobRecord::new("d".into(), "t", "", &link).needs_department());
        assert!(JobRecord::new("d".into(), "t", DEPARTMENT_PLACEHOLDER, &link).needs_department());
        assert!(!JobRecord::new("d".into(), "t", "HMRC", &link).needs_department());
    }
}
