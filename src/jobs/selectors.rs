//! Civil Service Jobs のページ構造に依存するセレクタ

use super::types::JobField;

// 検索ページ
pub const SEARCH_BUTTON: &str = "#submitSearch";

// 一覧ページ
pub const JOB_LIST_CONTAINER: &str = r#"ul[title="Job list"]"#;
pub const JOB_ITEM: &str = "li.search-results-job-box";
pub const JOB_LINK: &str = "h3.search-results-job-box-title > a";
pub const JOB_DEPARTMENT: &str = "div.search-results-job-box-department";

// ページング
pub const PAGING_MENU: &str = "div.search-results-paging-menu";
pub const NEXT_PAGE_LINK: &str = r#"a[title="Go to next search results page"]"#;

// 詳細ページ
pub const MAIN_PANEL: &str = "div.vac_display_panel_main_inner";
pub const CLOSING_DATE: &str = ".vac_display_closing_date";

const SIDE_PANEL: &str = "//div[@class='vac_display_panel_side_inner']";

/// 見出し直後の値 div を指す XPath
fn heading_value(heading: &str, value_class: &str) -> String {
    format!(
        "//h3[normalize-space()='{}']/following-sibling::div[@class='{}'][1]",
        heading, value_class
    )
}

fn side_heading_value(heading: &str) -> String {
    format!("{}{}", SIDE_PANEL, heading_value(heading, "vac_display_field_value"))
}

fn contact_value(label: &str) -> String {
    format!(
        "//h4[normalize-space()='Job contact :']/following-sibling::ul[@class='contact_details']\
         /li[span[normalize-space()='{}']]/span[@class='contact_details_value']",
        label
    )
}

/// 詳細ページのメインパネル項目 (XPath)
pub fn main_panel_fields() -> Vec<(JobField, String)> {
    vec![
        (
            JobField::Location,
            "//h2[@id='section_link_location']/following-sibling::div[@class='vac_display_field'][1]\
             //div[@class='vac_display_field_value']"
                .to_string(),
        ),
        (JobField::JobSummary, heading_value("Job summary", "vac_display_field_value")),
        (JobField::JobDescription, heading_value("Job description", "vac_display_field_value")),
        (
            JobField::PersonSpecification,
            heading_value("Person specification", "vac_display_field_value"),
        ),
        (JobField::Qualifications, heading_value("Qualifications", "vac_display_field_value")),
        (JobField::Behaviours, heading_value("Behaviours", "vac_display_field_value")),
        (JobField::TechnicalSkills, heading_value("Technical skills", "vac_display_field_value")),
        (
            JobField::Benefits,
            "//h2[@id='section_link_benefits']/following-sibling::div[contains(@class, 'vac_display_field')]\
             //div[contains(@class, 'vac_display_field_value')]"
                .to_string(),
        ),
        (
            JobField::SelectionProcess,
            "//h3[normalize-space()='Selection process details']/following-sibling::div\
             //div[@class='vac_display_field_value']"
                .to_string(),
        ),
        (JobField::ContactName, contact_value("Name :")),
        (JobField::ContactEmail, contact_value("Email :")),
    ]
}

/// 詳細ページのサイドパネル項目 (XPath)
pub fn side_panel_fields() -> Vec<(JobField, String)> {
    vec![
        (JobField::ReferenceNumber, side_heading_value("Reference number")),
        (
            JobField::Salary,
            format!(
                "{}//h3[normalize-space()='Salary']/following-sibling::div[contains(@class,'vac_display_field_value')][1]",
                SIDE_PANEL
            ),
        ),
        (
            JobField::JobGrade,
            format!(
                "{}//h3[normalize-space()='Job grade']/following-sibling::div//div[@class='vac_display_field_value'][1]",
                SIDE_PANEL
            ),
        ),
        (JobField::ContractType, side_heading_value("Contract type")),
        (JobField::RoleType, side_heading_value("Type of role")),
        (JobField::WorkingPattern, side_heading_value("Working pattern")),
        (JobField::NumberAvailable, side_heading_value("Number of jobs available")),
    ]
}

/// 一覧で部署が取れなかった場合のサイドパネル側の部署
pub fn side_panel_department() -> String {
    side_heading_value("Department")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_panel_paths_are_scoped() {
        for (_, xpath) in side_panel_fields() {
            assert!(xpath.starts_with(SIDE_PANEL), "{}", xpath);
        }
        assert!(side_panel_department().contains("normalize-space()='Department'"));
    }

    #[test]
    fn test_field_tables_do_not_overlap() {
        let main: Vec<_> = main_panel_fields().into_iter().map(|(f, _)| f).collect();
        for (field, _) in side_panel_fields() {
            assert!(!main.contains(&field));
        }
    }

    #[test]
    fn test_contact_xpath_shape() {
        let xpath = contact_value("Email :");
        assert!(xpath.contains("span[normalize-space()='Email :']"));
        assert!(!xpath.contains('\n'));
    }
}
