//! Build the catalog dataset for one country row

use serde::{Deserialize, Serialize};

use crate::api::{Dataset, GroupRef, Resource, Tag};
use crate::source::CountryRow;

pub const NAME_PREFIX: &str = "ourairports-";
pub const OWNER_ORG: &str = "ourairports";

const DATASET_SOURCE: &str = "OurAirports.com community web site.";
const PACKAGE_CREATOR: &str = "script";
const LICENSE_ID: &str = "Public Domain";
const METHODOLOGY: &str = "Other";
const METHODOLOGY_OTHER: &str = "Crowdsourced open data.";
const DATA_UPDATE_FREQUENCY: &str = "0";
const DATASET_DATE: &str = "01/01/2008-01/01/2028";
const CAVEATS: &str = "Unverified live data. May change at any time.";

const BASE_TAGS: &[&str] = &[
    "aviation",
    "geodata",
    "airports",
    "transportation",
    "facilities",
    "hxl",
];
const CROWDSOURCED_TAG: &str = "crowdsourced";

/// How the country group is referenced in the dataset's `groups` list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKey {
    #[default]
    Id,
    Name,
}

/// What the resources declare in their `format` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceFormat {
    /// Both resources declare `csv`, matching what the catalog has always held
    #[default]
    Uniform,
    /// The HXL resource declares `HXL`, the plain one `CSV`
    ByContent,
}

/// The two files published for every country, in publication order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Hxl,
    Csv,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Hxl, ResourceKind::Csv];

    /// Extension used by the OurAirports download URL
    pub fn extension(self) -> &'static str {
        match self {
            ResourceKind::Hxl => "hxl",
            ResourceKind::Csv => "csv",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ResourceKind::Hxl => "HXL tags",
            ResourceKind::Csv => "no HXL tags",
        }
    }

    fn declared_format(self, policy: ResourceFormat) -> &'static str {
        match (policy, self) {
            (ResourceFormat::Uniform, _) => "csv",
            (ResourceFormat::ByContent, ResourceKind::Hxl) => "HXL",
            (ResourceFormat::ByContent, ResourceKind::Csv) => "CSV",
        }
    }
}

/// Knobs that vary between catalog deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub group_key: GroupKey,
    pub crowdsourced_tag: bool,
    pub resource_format: ResourceFormat,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            group_key: GroupKey::default(),
            crowdsourced_tag: true,
            resource_format: ResourceFormat::default(),
        }
    }
}

/// Catalog identifier for a country; stable across runs for the same code
pub fn dataset_name(m49: &str) -> String {
    format!("{}{}", NAME_PREFIX, m49.trim().to_lowercase())
}

pub fn resource_url(iso2: &str, kind: ResourceKind) -> String {
    format!(
        "http://ourairports.com/countries/{}/airports.{}",
        iso2,
        kind.extension()
    )
}

fn build_resource(country: &str, iso2: &str, kind: ResourceKind, options: &BuildOptions) -> Resource {
    Resource {
        name: format!("List of airports in {} ({})", country, kind.label()),
        description: format!(
            "Spreadsheet listing airports in {}. Unverified member-uploaded data. \
             Note that this data comes live from the web site, and can change at any time.",
            country
        ),
        url: resource_url(iso2, kind),
        format: kind.declared_format(options.resource_format).to_string(),
    }
}

/// Build the full dataset for a row whose M49 code is `m49`
pub fn build_dataset(m49: &str, row: &CountryRow, options: &BuildOptions) -> Dataset {
    let code = m49.trim().to_lowercase();
    let country = row.name();
    let iso2 = row.iso2();

    let group = match options.group_key {
        GroupKey::Id => GroupRef::Id { id: code.clone() },
        GroupKey::Name => GroupRef::Name { name: code.clone() },
    };

    let mut tags: Vec<Tag> = BASE_TAGS.iter().map(|t| Tag::new(*t)).collect();
    if options.crowdsourced_tag {
        tags.push(Tag::new(CROWDSOURCED_TAG));
    }

    Dataset {
        name: dataset_name(&code),
        title: format!("Airports in {}", country),
        notes: format!(
            "List of airports in {}, with latitude and longitude. \
             Unverified community data from http://ourairports.com/countries/{}/",
            country, iso2
        ),
        dataset_source: DATASET_SOURCE.to_string(),
        private: false,
        subnational: true,
        owner_org: OWNER_ORG.to_string(),
        package_creator: PACKAGE_CREATOR.to_string(),
        license_id: LICENSE_ID.to_string(),
        methodology: METHODOLOGY.to_string(),
        methodology_other: METHODOLOGY_OTHER.to_string(),
        data_update_frequency: DATA_UPDATE_FREQUENCY.to_string(),
        dataset_date: DATASET_DATE.to_string(),
        caveats: CAVEATS.to_string(),
        groups: vec![group],
        tags,
        resources: ResourceKind::ALL
            .iter()
            .map(|kind| build_resource(country, iso2, *kind, options))
            .collect(),
    }
}
