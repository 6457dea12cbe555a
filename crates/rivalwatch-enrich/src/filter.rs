use crate::domain::{clean_domain, root_domain};
use crate::models::CompanyProfile;

/// Drops similar-company results that are really the base company itself:
/// its sub-domains, internal brands and products.
///
/// A candidate is removed when it has no domain, shares the base root
/// domain, is a sub-domain of the base domain, its name or domain contains
/// the base name, or it reports neither employees nor a country.
pub fn filter_competitors(
    base_name: &str,
    base_domain: &str,
    candidates: Vec<CompanyProfile>,
) -> Vec<CompanyProfile> {
    let base_name = base_name.trim().to_lowercase();
    let base_domain = clean_domain(base_domain);
    let base_root = if base_domain.is_empty() {
        String::new()
    } else {
        root_domain(&base_domain)
    };

    candidates
        .into_iter()
        .filter(|candidate| {
            let Some(domain) = candidate.domain.as_deref().map(clean_domain) else {
                return false;
            };
            if domain.is_empty() {
                return false;
            }
            let name = candidate.name.as_deref().unwrap_or_default().to_lowercase();

            let same_root = !base_root.is_empty() && root_domain(&domain) == base_root;
            let subdomain = !base_domain.is_empty() && domain.ends_with(&format!(".{base_domain}"));
            let name_overlap = !base_name.is_empty() && name.contains(&base_name);
            let domain_overlap = !base_name.is_empty() && domain.contains(&base_name);
            let looks_like_product = candidate.employees.is_none() && candidate.country.is_none();

            if same_root || subdomain || name_overlap || domain_overlap || looks_like_product {
                tracing::debug!(candidate = %domain, "Filtered out competitor candidate");
                return false;
            }
            true
        })
        .collect()
}
