// src/services/query_cache_tests.rs
//
// Query cache scenarios against a counting fake catalog
//
// INVARIANTS TESTED:
// - Identical concurrent requests collapse into one catalog call
// - Infinite queries fetch pages 1, 2, 3 in order and stop at the last page
// - Concurrent next-page triggers never start a second fetch
// - Blank search text never reaches the catalog
// - Errors are stored in state and only cleared by a manual retry
// - A refetch keeps previous data visible while loading
// - Results for invalidated keys are discarded

#[cfg(test)]
mod coalescing_tests {
    use crate::services::test_support::{FakeCatalog, Harness};

    #[tokio::test]
    async fn test_identical_concurrent_requests_share_one_fetch() {
        let h = Harness::new(FakeCatalog::new());

        let (a, b, c) = tokio::join!(
            h.queries.popular_movies(1),
            h.queries.popular_movies(1),
            h.queries.popular_movies(1)
        );

        assert_eq!(h.catalog.call_count(), 1);
        assert!(a.is_success());
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.data.unwrap().results.len(), 20);
    }

    #[tokio::test]
    async fn test_different_keys_fetch_separately() {
        let h = Harness::new(FakeCatalog::new());

        let (first, second) = tokio::join!(h.queries.popular_movies(1), h.queries.popular_movies(2));

        assert_eq!(h.catalog.call_count(), 2);
        assert_eq!(first.data.unwrap().page, 1);
        assert_eq!(second.data.unwrap().page, 2);
    }

    #[tokio::test]
    async fn test_fresh_data_is_served_from_cache() {
        let h = Harness::new(FakeCatalog::new());

        h.queries.movie_details(7).await;
        let again = h.queries.movie_details(7).await;

        assert_eq!(h.catalog.call_count(), 1);
        assert_eq!(again.data.unwrap().id, 7);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        use crate::events::ChangeNotifier;
        use std::time::Duration;

        let h = Harness::with_notifier(FakeCatalog::new(), ChangeNotifier::Local, Duration::ZERO);

        h.queries.movie_credits(3).await;
        h.queries.movie_credits(3).await;

        assert_eq!(h.catalog.call_count(), 2);
    }
}

#[cfg(test)]
mod infinite_query_tests {
    use crate::services::test_support::{FakeCatalog, Harness};

    #[tokio::test]
    async fn test_pages_accumulate_until_last_page() {
        let h = Harness::new(FakeCatalog::new().with_total_pages(3));

        let first = h.queries.search_movies("batman").await;
        assert!(first.is_success());
        let results = first.data.unwrap();
        assert_eq!(results.pages_loaded, 1);
        assert!(results.has_next_page);

        h.queries.search_next_page("batman").await;
        let third = h.queries.search_next_page("batman").await;
        let results = third.data.unwrap();
        assert_eq!(results.pages_loaded, 3);
        assert_eq!(results.movies.len(), 60);
        assert!(!results.has_next_page);

        // Past the last page: no call
        let fourth = h.queries.search_next_page("batman").await;
        assert_eq!(h.catalog.call_count(), 3);
        assert_eq!(h.catalog.pages(), vec![1, 2, 3]);
        assert_eq!(fourth.data.unwrap().pages_loaded, 3);
    }

    #[tokio::test]
    async fn test_next_page_on_empty_sequence_starts_at_one() {
        let h = Harness::new(FakeCatalog::new());

        let state = h.queries.search_next_page("alien").await;

        assert_eq!(h.catalog.pages(), vec![1]);
        assert_eq!(state.data.unwrap().pages_loaded, 1);
    }

    #[tokio::test]
    async fn test_concurrent_next_page_triggers_fetch_once() {
        let h = Harness::new(FakeCatalog::new().with_total_pages(5));
        h.queries.search_movies("heat").await;

        let (a, b, c) = tokio::join!(
            h.queries.search_next_page("heat"),
            h.queries.search_next_page("heat"),
            h.queries.search_next_page("heat")
        );

        assert_eq!(h.catalog.pages(), vec![1, 2]);
        assert_eq!(a.data.unwrap().pages_loaded, 2);
        assert_eq!(b.data.unwrap().pages_loaded, 2);
        assert_eq!(c.data.unwrap().pages_loaded, 2);
    }

    #[tokio::test]
    async fn test_single_page_listing_has_no_successor() {
        let h = Harness::new(FakeCatalog::new().with_total_pages(1));
        let kind = crate::integrations::MovieListKind::Upcoming;

        let state = h.queries.browse(kind).await;
        assert!(!state.data.unwrap().has_next_page);

        h.queries.browse_next_page(kind).await;
        assert_eq!(h.catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_earlier_pages() {
        use crate::error::CatalogError;

        let h = Harness::new(FakeCatalog::new().with_total_pages(4));
        h.queries.search_movies("jaws").await;

        h.catalog.fail_all(Some(CatalogError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        }));
        let failed = h.queries.search_next_page("jaws").await;
        assert!(failed.is_error());
        assert_eq!(failed.data.unwrap().pages_loaded, 1);

        h.catalog.fail_all(None);
        let recovered = h.queries.search_next_page("jaws").await;
        assert!(recovered.is_success());
        assert_eq!(h.catalog.pages(), vec![1, 2, 2]);
        assert_eq!(recovered.data.unwrap().pages_loaded, 2);
    }
}

#[cfg(test)]
mod search_rule_tests {
    use crate::services::query_cache::QueryStatus;
    use crate::services::test_support::{FakeCatalog, Harness};

    #[tokio::test]
    async fn test_blank_search_stays_idle() {
        let h = Harness::new(FakeCatalog::new());

        for text in ["", "   ", "\t\n"] {
            let state = h.queries.search_movies(text).await;
            assert_eq!(state.status, QueryStatus::Idle);
            assert!(state.data.unwrap().movies.is_empty());

            let next = h.queries.search_next_page(text).await;
            assert!(next.is_idle());

            assert!(h.queries.search_page(text, 1).await.is_idle());
        }

        assert_eq!(h.catalog.call_count(), 0);
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_search_text_is_trimmed_into_one_key() {
        let h = Harness::new(FakeCatalog::new());

        h.queries.search_movies("dune").await;
        h.queries.search_movies("  dune ").await;

        assert_eq!(h.catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_results_can_be_sorted_client_side() {
        use crate::domain::{SortDirection, SortField, SortOption};

        let h = Harness::new(FakeCatalog::new());
        let results = h.queries.search_movies("any").await.data.unwrap();

        let sorted = results.sorted_by(SortOption::new(SortField::OriginalTitle, SortDirection::Desc));
        assert_eq!(sorted.movies[0].title, "Movie 9");
    }
}

#[cfg(test)]
mod state_machine_tests {
    use std::time::Duration;

    use crate::error::CatalogError;
    use crate::events::ChangeNotifier;
    use crate::integrations::MovieListKind;
    use crate::services::catalog_queries::CatalogQueries;
    use crate::services::query_cache::QueryStatus;
    use crate::services::test_support::{FakeCatalog, Harness};

    #[tokio::test]
    async fn test_error_is_stored_and_not_retried_automatically() {
        let h = Harness::new(FakeCatalog::new());
        h.catalog.fail_all(Some(CatalogError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        }));

        let failed = h.queries.now_playing(1).await;
        assert_eq!(failed.status, QueryStatus::Error);
        assert!(failed.error.as_ref().unwrap().is_retryable());
        assert!(failed.data.is_none());
        assert_eq!(h.catalog.call_count(), 1);

        let key = CatalogQueries::movie_list_key(MovieListKind::NowPlaying, 1, "en");
        assert!(h.cache.peek(&key).is_error());
        assert_eq!(h.catalog.call_count(), 1);

        h.catalog.fail_all(None);
        let retried = h.queries.retry_movie_list(MovieListKind::NowPlaying, 1).await;
        assert!(retried.is_success());
        assert!(retried.error.is_none());
        assert_eq!(h.catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retryable() {
        let h = Harness::new(FakeCatalog::new());
        h.catalog.fail_all(Some(CatalogError::Api {
            status: 404,
            message: "The resource you requested could not be found.".to_string(),
        }));

        let state = h.queries.movie_details(999).await;
        let err = state.error.unwrap();
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_plain_reads_of_an_errored_key_make_no_new_call() {
        let h = Harness::new(FakeCatalog::new());
        h.catalog.fail_all(Some(CatalogError::Api {
            status: 404,
            message: "The resource you requested could not be found.".to_string(),
        }));

        let first = h.queries.movie_details(999).await;
        let second = h.queries.movie_details(999).await;

        assert_eq!(first.status, QueryStatus::Error);
        assert_eq!(second.status, QueryStatus::Error);
        assert!(second.error.unwrap().is_not_found());
        assert_eq!(h.catalog.call_count(), 1);

        h.catalog.fail_all(None);
        let retried = h.queries.retry_movie_details(999).await;
        assert!(retried.is_success());
        assert_eq!(h.catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn test_errored_search_waits_for_a_manual_retry() {
        let h = Harness::new(FakeCatalog::new());
        h.catalog.fail_all(Some(CatalogError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        }));

        assert!(h.queries.search_movies("alien").await.is_error());
        assert!(h.queries.search_movies("alien").await.is_error());
        assert_eq!(h.catalog.call_count(), 1);

        h.catalog.fail_all(None);
        let retried = h.queries.retry_search_movies("alien").await;
        assert!(retried.is_success());
        assert_eq!(retried.data.unwrap().pages_loaded, 1);
        assert_eq!(h.catalog.pages(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_invalidated_error_is_fetched_again() {
        let h = Harness::new(FakeCatalog::new());
        h.catalog.fail_all(Some(CatalogError::Transport("connection reset".to_string())));
        assert!(h.queries.upcoming(1).await.is_error());

        h.catalog.fail_all(None);
        h.cache
            .invalidate(&CatalogQueries::movie_list_key(MovieListKind::Upcoming, 1, "en"));
        assert!(h.queries.upcoming(1).await.is_success());
        assert_eq!(h.catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn test_refetch_keeps_previous_data_while_loading() {
        let h = Harness::with_notifier(
            FakeCatalog::new().with_delay(Duration::from_millis(40)),
            ChangeNotifier::Local,
            Duration::from_secs(300),
        );
        let first = h.queries.popular_movies(1).await;
        let key = CatalogQueries::movie_list_key(MovieListKind::Popular, 1, "en");
        let mut rx = h.cache.subscribe(&key);

        let queries = h.queries.clone();
        let refetch =
            tokio::spawn(async move { queries.retry_movie_list(MovieListKind::Popular, 1).await });

        rx.changed().await.unwrap();
        let loading = rx.borrow_and_update().clone();
        assert_eq!(loading.status, QueryStatus::Loading);
        assert!(loading.is_fetching);
        assert_eq!(
            loading.data.and_then(|d| d.into_movies()),
            first.data.clone()
        );

        let settled = refetch.await.unwrap();
        assert!(settled.is_success());
        assert_eq!(h.catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn test_result_for_invalidated_language_is_discarded() {
        let h = Harness::with_notifier(
            FakeCatalog::new().with_delay(Duration::from_millis(50)),
            ChangeNotifier::Local,
            Duration::from_secs(300),
        );

        let queries = h.queries.clone();
        let in_flight = tokio::spawn(async move { queries.movie_videos(12).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        h.locale.set_movie_language("ja").unwrap();
        let state = in_flight.await.unwrap();
        assert!(state.is_idle());

        // Let the superseded fetch finish; it must not resurrect the key
        tokio::time::sleep(Duration::from_millis(80)).await;
        let stale_key = CatalogQueries::movie_videos_key(12, "en");
        assert!(h.cache.peek(&stale_key).is_idle());
        assert!(h.cache.is_empty());

        let fresh = h.queries.movie_videos(12).await;
        assert!(fresh.is_success());
        assert_eq!(*h.catalog.languages.lock().unwrap(), vec!["en", "ja"]);
    }
}

#[cfg(test)]
mod housekeeping_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::integrations::MovieCatalog;
    use crate::services::catalog_queries::CatalogQueries;
    use crate::services::query_cache::{QueryCache, QueryData};
    use crate::services::test_support::FakeCatalog;

    #[tokio::test]
    async fn test_least_recently_used_entries_are_evicted() {
        let catalog: Arc<dyn MovieCatalog> = Arc::new(FakeCatalog::new().with_delay(Duration::ZERO));
        let cache = Arc::new(QueryCache::new(catalog, Duration::from_secs(300), 2));

        for id in 1..=3i64 {
            let key = CatalogQueries::movie_credits_key(id, "en");
            cache
                .fetch(key, move |catalog| async move {
                    catalog.movie_credits(id, Some("en")).await.map(QueryData::Credits)
                })
                .await;
        }

        assert_eq!(cache.len(), 2);
        assert!(cache.peek(&CatalogQueries::movie_credits_key(1, "en")).is_idle());
        assert!(cache.peek(&CatalogQueries::movie_credits_key(3, "en")).is_success());
    }

    #[tokio::test]
    async fn test_invalidate_language_only_touches_that_language() {
        let catalog: Arc<dyn MovieCatalog> = Arc::new(FakeCatalog::new().with_delay(Duration::ZERO));
        let cache = Arc::new(QueryCache::new(catalog, Duration::from_secs(300), 10));

        for language in ["en", "ja", "en"] {
            let key = CatalogQueries::movie_reviews_key(1, 1, language);
            let lang = language.to_string();
            cache
                .fetch(key, move |catalog| async move {
                    catalog.movie_reviews(1, 1, Some(&lang)).await.map(QueryData::Reviews)
                })
                .await;
        }
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.invalidate_language("en"), 1);
        assert!(cache.peek(&CatalogQueries::movie_reviews_key(1, 1, "ja")).is_success());

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_marks_stale_but_keeps_data() {
        let fake = Arc::new(FakeCatalog::new().with_delay(Duration::ZERO));
        let catalog: Arc<dyn MovieCatalog> = fake.clone();
        let cache = Arc::new(QueryCache::new(catalog, Duration::from_secs(300), 10));
        let key = CatalogQueries::movie_details_key(4, "en");

        let fetch = |cache: Arc<QueryCache>| async move {
            cache
                .fetch(CatalogQueries::movie_details_key(4, "en"), |catalog| async move {
                    catalog
                        .movie_details(4, Some("en"))
                        .await
                        .map(|d| QueryData::Detail(Box::new(d)))
                })
                .await
        };

        fetch(Arc::clone(&cache)).await;
        cache.invalidate(&key);
        assert!(cache.peek(&key).data.is_some());

        fetch(Arc::clone(&cache)).await;
        assert_eq!(fake.call_count(), 2);
        assert!(cache.remove(&key));
    }
}
