//! Startup data for the workspace: a JSON seed file when `SEED_PATH` is
//! set, the built-in demo lists otherwise.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::actions::{Identified, Store};
use crate::config::Config;
use crate::lists::{Lists, Workspace};
use crate::models::record::{Contact, DiscardedContact, ListKind, OutboundContact, Prospect};
use crate::models::status::{OutboundStatus, ProspectStatus};
use crate::models::template::{Template, TemplateId};
use crate::templates::TemplateCatalog;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub prospects: Vec<Prospect>,
    pub outbounds: Vec<OutboundContact>,
    pub discarded: Vec<DiscardedContact>,
    pub templates: Vec<Template>,
}

pub fn load_workspace(config: &Config) -> Result<Workspace> {
    let seed = match &config.seed_path {
        Some(path) => read_seed(path)?,
        None => {
            info!("No SEED_PATH set, using demo data");
            demo_seed()
        }
    };
    build_workspace(seed, config)
}

pub fn read_seed(path: &Path) -> Result<SeedFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not valid JSON", path.display()))?;
    info!(
        "Loaded seed file {} ({} prospects, {} outbounds, {} discarded, {} templates)",
        path.display(),
        seed.prospects.len(),
        seed.outbounds.len(),
        seed.discarded.len(),
        seed.templates.len()
    );
    Ok(seed)
}

/// Validates the seed as a whole. Any bad record or template rejects it.
pub fn build_workspace(seed: SeedFile, config: &Config) -> Result<Workspace> {
    let contacts = seed
        .prospects
        .iter()
        .map(|r| (r.id, &r.contact))
        .chain(seed.outbounds.iter().map(|r| (r.id, &r.contact)))
        .chain(seed.discarded.iter().map(|r| (r.id, &r.contact)));

    let mut seen = HashSet::new();
    for (id, contact) in contacts {
        if let Err(err) = contact.validate() {
            bail!("Seed record {id}: {}", err.message);
        }
        if !seen.insert(id) {
            bail!("Seed record id {id} appears more than once");
        }
    }

    let mut templates = TemplateCatalog::new(config.template_ids.clone(), config.template_body_max);
    for template in seed.templates {
        let id = template.id;
        if let Err(errors) = templates.save(template) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            bail!("Seed template {id}: {}", messages.join("; "));
        }
    }

    let lists = Lists {
        prospects: store(ListKind::Prospects, seed.prospects)?,
        outbounds: store(ListKind::Outbounds, seed.outbounds)?,
        discarded: store(ListKind::Discarded, seed.discarded)?,
    };
    Ok(Workspace::new(lists, templates))
}

fn store<T: Identified>(kind: ListKind, records: Vec<T>) -> Result<Store<T>> {
    Store::new(kind, records)
        .map_err(|id| anyhow::anyhow!("Seed record id {id} appears twice in {}", kind.as_str()))
}

fn contact(name: &str, title: &str, company: &str, location: &str, followers: u64) -> Contact {
    Contact {
        location: location.to_string(),
        linkedin_url: format!(
            "https://linkedin.com/in/{}",
            name.to_lowercase().replace(' ', "-")
        ),
        follower_count: followers,
        ..Contact::new(name, title, company)
    }
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn demo_seed() -> SeedFile {
    let sarah = Prospect::new(contact(
        "Sarah Johnson",
        "VP of Sales",
        "TechCorp",
        "San Francisco, CA",
        2400,
    ));
    let mut mike = Prospect::new(contact(
        "Mike Chen",
        "Head of Growth",
        "StartupX",
        "New York, NY",
        1500,
    ));
    mike.status = ProspectStatus::Contacted;
    mike.status_changed_at = date(2024, 3, 18);
    mike.assigned_template = Some(TemplateId('A'));

    let mut emma = OutboundContact::new(contact(
        "Emma Rodriguez",
        "Director of Marketing",
        "GrowthLabs",
        "Austin, TX",
        3200,
    ));
    emma.status = OutboundStatus::Responded;
    emma.status_changed_at = date(2024, 3, 15);
    emma.assigned_template = Some(TemplateId('B'));
    let david = OutboundContact::new(contact(
        "David Park",
        "Founder",
        "Brightline",
        "Seattle, WA",
        820,
    ));

    let discarded = [
        (
            contact("John Smith", "VP of Sales", "Old Corp", "Boston, MA", 500),
            date(2024, 3, 20),
        ),
        (
            contact(
                "Lisa Wang",
                "Marketing Director",
                "Legacy Inc",
                "Chicago, IL",
                750,
            ),
            date(2024, 3, 19),
        ),
    ]
    .into_iter()
    .filter_map(|(contact, day)| {
        Some(DiscardedContact::from_record(
            &Prospect::new(contact),
            ListKind::Prospects,
            day?,
        ))
    })
    .collect();

    SeedFile {
        prospects: vec![sarah, mike],
        outbounds: vec![emma, david],
        discarded,
        templates: vec![
            Template {
                id: TemplateId('A'),
                descriptor: "Intro".to_string(),
                body: "Hi {first_name}, I came across your profile and would love to connect."
                    .to_string(),
            },
            Template {
                id: TemplateId('B'),
                descriptor: "Follow-up".to_string(),
                body: "Hi {first_name}, following up on my last note. Open to a quick chat?"
                    .to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_demo_seed_builds() {
        let ws = build_workspace(demo_seed(), &Config::default()).unwrap();
        assert_eq!(ws.lists.prospects.len(), 2);
        assert_eq!(ws.lists.outbounds.len(), 2);
        assert_eq!(ws.lists.discarded.len(), 2);
        assert!(ws.templates.contains(TemplateId('A')));
        assert_eq!(ws.lists.discarded.records()[0].contact.name, "John Smith");
    }

    #[test]
    fn test_seed_file_without_ids_gets_fresh_ones() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "prospects": [
                    {{"name": "Sarah Johnson", "company": "TechCorp"}},
                    {{"name": "Mike Chen", "status": "contacted", "follower_count": 1500}}
                ],
                "templates": [{{"id": "c", "descriptor": "Short", "body": "Hi {{first_name}}"}}]
            }}"#
        )
        .unwrap();

        let seed = read_seed(file.path()).unwrap();
        let ws = build_workspace(seed, &Config::default()).unwrap();
        let prospects = ws.lists.prospects.records();
        assert_ne!(prospects[0].id, prospects[1].id);
        assert_eq!(prospects[0].status, ProspectStatus::New);
        assert_eq!(prospects[1].status, ProspectStatus::Contacted);
        assert!(ws.templates.contains(TemplateId('C')));
        assert!(ws.lists.outbounds.is_empty());
    }

    #[test]
    fn test_duplicate_ids_across_lists_rejected() {
        let mut seed = demo_seed();
        let mut copy = OutboundContact::new(Contact::new("Copy", "", ""));
        copy.id = seed.prospects[0].id;
        seed.outbounds.push(copy);

        let err = build_workspace(seed, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut seed = demo_seed();
        seed.prospects.push(Prospect::new(Contact::new("   ", "CTO", "Acme")));
        assert!(build_workspace(seed, &Config::default()).is_err());
    }

    #[test]
    fn test_over_limit_template_rejected() {
        let mut seed = demo_seed();
        seed.templates.push(Template {
            id: TemplateId('D'),
            descriptor: "Long".to_string(),
            body: "x".repeat(305),
        });
        let err = build_workspace(seed, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Seed template D"));
    }

    #[test]
    fn test_missing_seed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_seed(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read seed file"));
    }
}
