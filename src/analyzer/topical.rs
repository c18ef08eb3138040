// Industry relevance between a job and a group name, independent of geography
use crate::utils::{contains_any, fold};

/// Added for every category present on both sides.
pub const CATEGORY_BONUS: i32 = 30;
/// Added when the group name advertises jobs in general.
pub const HIRING_TERM_BONUS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Security,
    Logistics,
    Technology,
    Manufacturing,
    Sales,
    Marketing,
    HumanResources,
    CustomerService,
    OfficeAdministration,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Security,
        Category::Logistics,
        Category::Technology,
        Category::Manufacturing,
        Category::Sales,
        Category::Marketing,
        Category::HumanResources,
        Category::CustomerService,
        Category::OfficeAdministration,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Security => &["אבטחה", "מאבטח", "שמירה", "שומר", "סייר", "security", "guard"],
            Category::Logistics => &["לוגיסטיקה", "מחסן", "מלגזה", "מלגזן", "ליקוט", "הפצה", "שילוח", "logistics", "warehouse", "forklift"],
            Category::Technology => &["הייטק", "היי טק", "פיתוח", "מפתח", "תוכנה", "מתכנת", "developer", "software", "full stack", "fullstack", "devops", "backend", "frontend", "hi-tech", "high tech"],
            Category::Manufacturing => &["ייצור", "מפעל", "תעשייה", "פס ייצור", "manufacturing", "factory", "production"],
            Category::Sales => &["מכירות", "מכירה", "איש מכירות", "sales"],
            Category::Marketing => &["שיווק", "דיגיטל", "קמפיין", "marketing", "digital"],
            Category::HumanResources => &["משאבי אנוש", "גיוס עובדים", "רכז גיוס", "רכזת גיוס", "human resources", "recruiter", "recruitment"],
            Category::CustomerService => &["שירות לקוחות", "מוקד", "מוקדן", "מוקדנית", "נציג שירות", "נציגת שירות", "customer service", "call center", "support"],
            Category::OfficeAdministration => &["אדמיניסטרציה", "מזכירה", "מזכיר", "פקידה", "פקיד", "בק אופיס", "back office", "office manager", "admin"],
        }
    }
}

/// Generic terms that mark a group as a jobs board.
const HIRING_TERMS: &[&str] = &["דרושים", "דרושות", "דרוש", "משרות", "משרה", "עבודה", "jobs", "hiring"];

/// Categories whose keywords appear in both texts.
pub fn shared_categories(job_text: &str, target_name: &str) -> Vec<Category> {
    let job_text = fold(job_text);
    let target_name = fold(target_name);
    Category::ALL
        .into_iter()
        .filter(|c| contains_any(&job_text, c.keywords()) && contains_any(&target_name, c.keywords()))
        .collect()
}

/// Cumulative category bonus plus the flat hiring-term bonus.
pub fn topical_bonus(job_text: &str, target_name: &str) -> i32 {
    let categories = shared_categories(job_text, target_name).len() as i32;
    let mut bonus = categories * CATEGORY_BONUS;
    if contains_any(&fold(target_name), HIRING_TERMS) {
        bonus += HIRING_TERM_BONUS;
    }
    bonus
}
