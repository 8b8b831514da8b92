use super::entity::{MoviePage, PAGE_SIZE};
use crate::domain::{DomainError, DomainResult};

/// Validates all MoviePage invariants
pub fn validate_movie_page(page: &MoviePage) -> DomainResult<()> {
    validate_page_number(page)?;
    validate_result_count(page)?;
    Ok(())
}

/// Pages are 1-based and never exceed total_pages when results exist
fn validate_page_number(page: &MoviePage) -> DomainResult<()> {
    if page.page == 0 {
        return Err(DomainError::InvariantViolation(
            "Page numbers start at 1".to_string(),
        ));
    }
    if page.total_results > 0 && page.page > page.total_pages {
        return Err(DomainError::InvariantViolation(format!(
            "Page {} exceeds total_pages {}",
            page.page, page.total_pages
        )));
    }
    Ok(())
}

fn validate_result_count(page: &MoviePage) -> DomainResult<()> {
    if page.results.len() > PAGE_SIZE {
        return Err(DomainError::InvariantViolation(format!(
            "Page holds {} results, limit is {}",
            page.results.len(),
            PAGE_SIZE
        )));
    }
    Ok(())
}

/// Invariants that must hold true for MoviePage:
///
/// 1. results.len() <= PAGE_SIZE
/// 2. page >= 1
/// 3. page <= total_pages whenever total_results > 0
