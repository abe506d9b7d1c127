//! Static portfolio content and the panel strip derived from it.

use serde::{Deserialize, Serialize};
use std::path::Path;

const EMBEDDED_CONTENT: &str = include_str!("../../assets/content.json");

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("content is missing {0}")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, ContentError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personal {
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub hero_subtitle: String,
    #[serde(default)]
    pub scroll_hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introduction {
    pub tagline: String,
    pub paragraph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub accent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormPlaceholders {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Default for FormPlaceholders {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            email: "your@email.com".to_string(),
            message: "Tell me about your project...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub bio: String,
    #[serde(default)]
    pub placeholders: FormPlaceholders,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub copyright: String,
    #[serde(default)]
    pub built_with: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContent {
    pub personal: Personal,
    pub introduction: Introduction,
    #[serde(default)]
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub galleries: Vec<Gallery>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    pub contact: ContactInfo,
    #[serde(default)]
    pub footer: Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Hero,
    Foundation,
    Gallery(usize),
    Services,
    Contact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub kind: PanelKind,
    pub label: String,
}

impl PortfolioContent {
    /// Content compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CONTENT)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let content: Self = serde_json::from_str(json)?;
        content.validate()?;
        Ok(content)
    }

    fn validate(&self) -> Result<()> {
        if self.personal.name.trim().is_empty() {
            return Err(ContentError::Missing("personal.name"));
        }
        if self.galleries.iter().any(|gallery| gallery.title.trim().is_empty()) {
            return Err(ContentError::Missing("a gallery title"));
        }
        Ok(())
    }

    /// Panels in strip order: hero, foundation, one per gallery, services,
    /// contact.
    pub fn panels(&self) -> Vec<Panel> {
        let mut panels = vec![
            Panel {
                kind: PanelKind::Hero,
                label: "Hero".to_string(),
            },
            Panel {
                kind: PanelKind::Foundation,
                label: "Foundation".to_string(),
            },
        ];
        panels.extend(self.galleries.iter().enumerate().map(|(index, gallery)| Panel {
            kind: PanelKind::Gallery(index),
            label: gallery.title.clone(),
        }));
        panels.push(Panel {
            kind: PanelKind::Services,
            label: "Services".to_string(),
        });
        panels.push(Panel {
            kind: PanelKind::Contact,
            label: "Contact".to_string(),
        });
        panels
    }
}

pub const ALL_CATEGORIES: &str = "All";

impl Gallery {
    /// Filter tabs: "All" followed by each category in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories = vec![ALL_CATEGORIES];
        for project in &self.projects {
            if !categories.contains(&project.category.as_str()) {
                categories.push(&project.category);
            }
        }
        categories
    }

    pub fn filtered<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Project> + 'a {
        self.projects
            .iter()
            .filter(move |project| category == ALL_CATEGORIES || project.category == category)
    }
}

/// Parses `#rrggbb` into its channels.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_content_parses_into_seven_panels() {
        let content = PortfolioContent::embedded().unwrap();
        let panels = content.panels();
        assert_eq!(panels.len(), 7);
        assert_eq!(panels[0].kind, PanelKind::Hero);
        assert_eq!(panels[2].kind, PanelKind::Gallery(0));
        assert_eq!(panels[6].kind, PanelKind::Contact);
    }

    #[test]
    fn embedded_accents_are_valid_colours() {
        let content = PortfolioContent::embedded().unwrap();
        for gallery in &content.galleries {
            for project in &gallery.projects {
                if let Some(accent) = &project.accent {
                    assert!(parse_hex_color(accent).is_some(), "bad accent {accent}");
                }
            }
        }
    }

    #[test]
    fn panel_count_follows_galleries() {
        let mut content = PortfolioContent::embedded().unwrap();
        content.galleries.truncate(1);
        assert_eq!(content.panels().len(), 5);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let gallery = Gallery {
            title: "Work".to_string(),
            subtitle: String::new(),
            projects: ["AI/ML", "Utility", "AI/ML"]
                .iter()
                .map(|category| Project {
                    title: "p".to_string(),
                    description: String::new(),
                    tech: Vec::new(),
                    category: category.to_string(),
                    accent: None,
                    link: None,
                })
                .collect(),
        };
        assert_eq!(gallery.categories(), vec!["All", "AI/ML", "Utility"]);
        assert_eq!(gallery.filtered("AI/ML").count(), 2);
        assert_eq!(gallery.filtered(ALL_CATEGORIES).count(), 3);
        assert_eq!(gallery.filtered("Media").count(), 0);
    }

    #[test]
    fn load_reads_a_content_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EMBEDDED_CONTENT.as_bytes()).unwrap();
        let loaded = PortfolioContent::load(file.path()).unwrap();
        assert_eq!(loaded, PortfolioContent::embedded().unwrap());
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let missing = PortfolioContent::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, ContentError::Io { .. }));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(PortfolioContent::load(&bad), Err(ContentError::Json(_))));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(EMBEDDED_CONTENT).unwrap();
        value["personal"]["name"] = serde_json::Value::String("  ".to_string());
        let err = PortfolioContent::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ContentError::Missing("personal.name")));
    }

    #[test]
    fn hex_colours_parse_strictly() {
        assert_eq!(parse_hex_color("#d4af37"), Some([0xd4, 0xaf, 0x37]));
        assert_eq!(parse_hex_color("d4af37"), None);
        assert_eq!(parse_hex_color("#d4af3"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
