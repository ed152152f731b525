//! Static directory of bookable services, rendered by the `get_services`
//! tool. Defined once at startup; handlers never mutate it.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub category: String,
    pub resources: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub organization: String,
    pub services: Vec<ServiceEntry>,
    pub hours: String,
    pub contact: String,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self {
            organization: "Wellness Partners".to_string(),
            services: vec![
                entry("Primary Care", &["Dr. Smith", "Dr. Johnson"]),
                entry("Dermatology", &["Dr. Brown"]),
                entry("Physical Therapy", &["Dr. Wilson"]),
                entry("Mental Health", &["Dr. Taylor"]),
            ],
            hours: "Monday-Friday 8:00 AM - 5:00 PM, Saturday 9:00 AM - 12:00 PM".to_string(),
            contact: "(555) 123-HEAL".to_string(),
        }
    }
}

impl ServiceCatalog {
    /// Voice-friendly rendering: one sentence per service, then hours and
    /// contact.
    pub fn narration(&self) -> String {
        let mut lines = Vec::with_capacity(self.services.len() + 3);
        lines.push(format!("{} offers the following services:", self.organization));
        for service in &self.services {
            lines.push(format!("{} with {}.", service.category, join_names(&service.resources)));
        }
        lines.push(format!("Hours: {}.", self.hours));
        lines.push(format!("Contact: {}.", self.contact));
        lines.join(" ")
    }

    pub fn categories(&self) -> Vec<&str> {
        self.services.iter().map(|service| service.category.as_str()).collect()
    }
}

fn entry(category: &str, resources: &[&str]) -> ServiceEntry {
    ServiceEntry {
        category: category.to_string(),
        resources: resources.iter().map(ToString::to_string).collect(),
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} or {last}", head.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceCatalog;

    #[test]
    fn narration_lists_every_service() {
        let catalog = ServiceCatalog::default();
        let narration = catalog.narration();

        assert!(narration.starts_with("Wellness Partners offers"));
        assert!(narration.contains("Primary Care with Dr. Smith or Dr. Johnson."));
        assert!(narration.contains("Dermatology with Dr. Brown."));
        assert!(narration.contains("Hours: Monday-Friday"));
        assert!(narration.contains("Contact: (555) 123-HEAL."));
    }

    #[test]
    fn categories_follow_declaration_order() {
        let catalog = ServiceCatalog::default();
        assert_eq!(
            catalog.categories(),
            vec!["Primary Care", "Dermatology", "Physical Therapy", "Mental Health"],
        );
    }
}
