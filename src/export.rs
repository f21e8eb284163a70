use csv::QuoteStyle;
use csv::WriterBuilder;

use crate::error::Result;
use crate::model::User;

const HEADER: [&str; 8] = [
    "name", "bio", "country", "Kaggle", "Twitter", "LinkedIn", "Github", "Blog",
];

/// Serializes records to the flat output format: one header line, one line
/// per user in accumulation order.
///
/// Deliberately not RFC 4180: only the bio is quoted, with newlines
/// flattened to spaces and commas to semicolons; every other field goes out
/// verbatim. Downstream consumers of this file expect exactly that shape.
pub fn to_csv(users: &[User]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for user in users {
        let bio = format!(
            "\"{}\"",
            user.bio.replace('\n', " ").replace(',', ";")
        );
        writer.write_record([
            user.display_name.as_str(),
            bio.as_str(),
            user.country.as_str(),
            user.kaggle_url.as_str(),
            user.twitter_url.as_str(),
            user.linked_in_url.as_str(),
            user.github_url.as_str(),
            user.website_url.as_str(),
        ])?;
    }
    writer.flush()?;

    let buffer = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(buffer)?.trim_end_matches('\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taro() -> User {
        User {
            display_name: "Taro Yamada".to_string(),
            bio: "hello\nworld,foo".to_string(),
            country: "Japan".to_string(),
            kaggle_url: "https://www.kaggle.com/taro".to_string(),
            twitter_url: "https://twitter.com/taro".to_string(),
            linked_in_url: "https://www.linkedin.com/in/taro".to_string(),
            github_url: "https://github.com/taro-gh".to_string(),
            website_url: "https://taro.example".to_string(),
            ..User::default()
        }
    }

    #[test]
    fn zero_records_yield_exactly_the_header() {
        assert_eq!(
            to_csv(&[]).unwrap(),
            "name,bio,country,Kaggle,Twitter,LinkedIn,Github,Blog"
        );
    }

    #[test]
    fn bio_is_quoted_and_flattened_while_other_fields_stay_verbatim() {
        let out = to_csv(&[taro()]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Taro Yamada,\"hello world;foo\",Japan,https://www.kaggle.com/taro,\
             https://twitter.com/taro,https://www.linkedin.com/in/taro,\
             https://github.com/taro-gh,https://taro.example"
        );
    }

    #[test]
    fn records_keep_accumulation_order() {
        let mut second = taro();
        second.display_name = "Hanako".to_string();
        let out = to_csv(&[taro(), second]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].starts_with("Taro Yamada,"));
        assert!(lines[2].starts_with("Hanako,"));
    }
}
