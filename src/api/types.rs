use serde::{Deserialize, Deserializer, Serialize};

/// Job ids as issued by the API.
pub type JobId = u64;

/// Summary of a job posting for list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
  pub id: JobId,
  pub badge_letters: String,
  pub title: String,
  pub company: String,
  #[serde(default)]
  pub date: String,
  pub relevance_score: f64,
  pub days_ago: u32,
}

/// Full job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
  #[serde(flatten)]
  pub summary: JobSummary,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub qualifications: Vec<String>,
  #[serde(default)]
  pub reviews: Vec<String>,
  // The live API sends "Full-Time" / "$60,000+" where older payloads sent numbers
  #[serde(default, deserialize_with = "string_or_number")]
  pub duration: String,
  #[serde(default)]
  pub location: String,
  #[serde(default, deserialize_with = "string_or_number")]
  pub salary: String,
  #[serde(rename = "coverImgURL", default)]
  pub cover_img_url: String,
  #[serde(rename = "companyURL", default)]
  pub company_url: String,
}

impl JobDetail {
  pub fn id(&self) -> JobId {
    self.summary.id
  }
}

/// Client-side ordering of search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
  /// Highest relevance score first
  #[default]
  Relevant,
  /// Fewest days ago first
  Recent,
}

impl SortBy {
  pub fn toggled(self) -> Self {
    match self {
      SortBy::Relevant => SortBy::Recent,
      SortBy::Recent => SortBy::Relevant,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortBy::Relevant => "Relevant",
      SortBy::Recent => "Recent",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
  Next,
  Previous,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(serde_json::Number),
  }

  Ok(match Raw::deserialize(deserializer)? {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_detail_accepts_numeric_and_text_fields() {
    let json = r#"{
      "id": 42, "badgeLetters": "AC", "title": "Rust Engineer", "company": "Acme",
      "date": "3d", "relevanceScore": 0.87, "daysAgo": 3,
      "description": "Build things", "qualifications": ["Rust"], "reviews": ["Great"],
      "duration": 12, "location": "Remote", "salary": "$90,000+",
      "coverImgURL": "https://example.com/c.png", "companyURL": "https://acme.test"
    }"#;

    let detail: JobDetail = serde_json::from_str(json).unwrap();
    assert_eq!(detail.id(), 42);
    assert_eq!(detail.summary.badge_letters, "AC");
    assert_eq!(detail.duration, "12");
    assert_eq!(detail.salary, "$90,000+");
    assert_eq!(detail.cover_img_url, "https://example.com/c.png");
  }

  #[test]
  fn test_sort_by_toggle() {
    assert_eq!(SortBy::Relevant.toggled(), SortBy::Recent);
    assert_eq!(SortBy::Recent.toggled(), SortBy::Relevant);
  }
}
