use scraper::{Html, Selector};
use url::Url;

use crate::models::{ParseResult, SkipReason};

/// Extract the vacancy description from a detail page
///
/// The description is the text of the first `.col-sm-8` column inside the
/// first `.box-spacing-md` container, with whitespace runs collapsed.
///
/// # Examples
/// ```
/// use vacancy_feed::models::ParseResult;
/// use vacancy_feed::parser::extract_description;
///
/// let html = r#"<div class="box-spacing-md"><div class="col-sm-8"><p>Dein Job</p></div></div>"#;
/// assert_eq!(extract_description(html), ParseResult::Ok("Dein Job".to_string()));
/// ```
pub fn extract_description(html_body: &str) -> ParseResult<String> {
    let document = Html::parse_document(html_body);
    let box_selector = Selector::parse(".box-spacing-md").expect("Invalid CSS selector");
    let column_selector = Selector::parse(".col-sm-8").expect("Invalid CSS selector");

    let Some(container) = document.select(&box_selector).next() else {
        return ParseResult::Skip(SkipReason::MissingDescription);
    };
    let Some(column) = container.select(&column_selector).next() else {
        return ParseResult::Skip(SkipReason::MissingDescription);
    };

    let raw: String = column.text().collect();
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.is_empty() {
        ParseResult::Skip(SkipReason::MissingDescription)
    } else {
        ParseResult::Ok(text)
    }
}

/// Read the `jobId` query parameter of a detail URL
pub fn job_id_from_url(link: &str) -> Option<String> {
    let parsed = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            tracing::info!(url = %link, error = %e, "cannot parse detail url");
            return None;
        }
    };

    parsed
        .query_pairs()
        .find(|(key, _)| key == "jobId")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Crew Member</title></head>
<body>
  <div class="header box-spacing-sm"><div class="col-sm-8">Navigation</div></div>
  <div class="box box-spacing-md">
    <div class="row">
      <div class="col-sm-4">Sidebar</div>
      <div class="col-sm-8">
        <h2>Deine Aufgaben</h2>
        <p>Du bereitest   unsere Produkte zu &amp; begeisterst Gäste.</p>
      </div>
    </div>
  </div>
  <div class="box box-spacing-md"><div class="col-sm-8">Second box</div></div>
</body>
</html>"#;

    #[test]
    fn test_extract_description_from_first_box() {
        assert_eq!(
            extract_description(DETAIL_PAGE),
            ParseResult::Ok(
                "Deine Aufgaben Du bereitest unsere Produkte zu & begeisterst Gäste.".to_string()
            )
        );
    }

    #[test]
    fn test_missing_container_is_skip() {
        let html = "<html><body><div class=\"col-sm-8\">Loose column</div></body></html>";
        assert_eq!(
            extract_description(html),
            ParseResult::Skip(SkipReason::MissingDescription)
        );
    }

    #[test]
    fn test_empty_column_is_skip() {
        let html = "<div class=\"box-spacing-md\"><div class=\"col-sm-8\">   </div></div>";
        assert_eq!(
            extract_description(html),
            ParseResult::Skip(SkipReason::MissingDescription)
        );
    }

    #[test]
    fn test_empty_html() {
        assert!(matches!(extract_description(""), ParseResult::Skip(_)));
    }

    #[test]
    fn test_job_id_from_url() {
        assert_eq!(
            job_id_from_url("https://karriere.mcdonalds.de/stellenangebot/job-detail.html?jobId=123-abc"),
            Some("123-abc".to_string())
        );
        assert_eq!(
            job_id_from_url("https://example.org/detail?lang=de&jobId=42"),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_job_id_missing() {
        assert_eq!(job_id_from_url("https://example.org/detail?lang=de"), None);
        assert_eq!(job_id_from_url("https://example.org/detail?jobId="), None);
        assert_eq!(job_id_from_url("not a url"), None);
    }
}
