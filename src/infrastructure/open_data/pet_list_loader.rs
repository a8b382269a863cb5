//! Paginated pet list client for the adoption open-data service.

use std::sync::Arc;

use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use super::dto::PetResponse;
use crate::domain::entities::{PageRequest, Pet};
use crate::domain::errors::{PetListError, TransportError};
use crate::domain::ports::{HttpClient, HttpResponse, PetLoader};
use crate::domain::task::Completion;

/// Public endpoint of the adoption dataset.
pub const DEFAULT_ENDPOINT: &str = "https://data.moa.gov.tw/Service/OpenData/TransService.aspx";

/// Dataset identifier of the adoptable animals list.
pub const DATASET_UNIT_ID: &str = "QcbUEzN6E6DL";

/// Loads pages of pets over an [`HttpClient`].
pub struct RemotePetLoader<C> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    endpoint: Url,
    client: C,
}

impl<C: HttpClient + 'static> RemotePetLoader<C> {
    /// Creates a loader querying `endpoint`.
    #[must_use]
    pub fn new(endpoint: Url, client: C) -> Self {
        Self {
            inner: Arc::new(Inner { endpoint, client }),
        }
    }

    /// Builds the request URL for `page`.
    ///
    /// Any query already on the endpoint is kept in front of the dataset
    /// parameters.
    #[must_use]
    pub fn request_url(&self, page: PageRequest) -> Url {
        page_url(&self.inner.endpoint, page)
    }
}

fn page_url(endpoint: &Url, page: PageRequest) -> Url {
    let params = format!(
        "UnitId={DATASET_UNIT_ID}&$top={}&$skip={}",
        page.size(),
        page.offset()
    );
    let query = match endpoint.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{params}"),
        _ => params,
    };
    let mut url = endpoint.clone();
    url.set_query(Some(&query));
    url
}

fn map_response(result: Result<HttpResponse, TransportError>) -> Result<Vec<Pet>, PetListError> {
    let response = result.map_err(|_| PetListError::Connectivity)?;

    if response.status != StatusCode::OK {
        warn!(status = %response.status, "Pet list request rejected");
        return Err(PetListError::InvalidData);
    }

    let records: Vec<PetResponse> = serde_json::from_slice(&response.body).map_err(|e| {
        warn!(error = %e, "Failed to decode pet list");
        PetListError::InvalidData
    })?;

    Ok(records.into_iter().map(Pet::from).collect())
}

impl<C: HttpClient + 'static> PetLoader for RemotePetLoader<C> {
    fn load(&self, page: PageRequest, completion: Completion<Vec<Pet>, PetListError>) {
        let url = self.request_url(page);
        debug!(page = page.page(), url = %url, "Loading pets");

        let owner = Arc::downgrade(&self.inner);
        let _task = self.inner.client.get(
            &url,
            Box::new(move |result| {
                if owner.upgrade().is_none() {
                    return;
                }
                let pets = map_response(result);
                if let Ok(pets) = &pets {
                    debug!(page = page.page(), count = pets.len(), "Loaded pets");
                }
                completion(pets);
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PetId;
    use crate::domain::ports::mocks::HttpClientSpy;
    use parking_lot::Mutex;
    use test_case::test_case;

    type Received = Arc<Mutex<Vec<Result<Vec<Pet>, PetListError>>>>;

    fn make_sut(endpoint: &str) -> (RemotePetLoader<Arc<HttpClientSpy>>, Arc<HttpClientSpy>) {
        let client = HttpClientSpy::new();
        let loader = RemotePetLoader::new(Url::parse(endpoint).unwrap(), Arc::clone(&client));
        (loader, client)
    }

    fn load(loader: &RemotePetLoader<Arc<HttpClientSpy>>, page: u32) -> Received {
        let received: Received = Arc::default();
        let sink = Arc::clone(&received);
        loader.load(
            PageRequest::new(page),
            Box::new(move |r| sink.lock().push(r)),
        );
        received
    }

    #[test]
    fn test_first_page_url() {
        let (loader, client) = make_sut("https://x.test");

        let _ = load(&loader, 0);

        let url = &client.requested_urls()[0];
        assert_eq!(url.host_str(), Some("x.test"));
        assert_eq!(url.query(), Some("UnitId=QcbUEzN6E6DL&$top=20&$skip=0"));
        assert_eq!(
            url.as_str(),
            "https://x.test/?UnitId=QcbUEzN6E6DL&$top=20&$skip=0"
        );
    }

    #[test_case(0, 0 ; "first page")]
    #[test_case(1, 20 ; "second page")]
    #[test_case(2, 40 ; "third page")]
    #[test_case(57, 1140 ; "deep page")]
    fn test_offset_follows_page(page: u32, skip: u64) {
        let (loader, client) = make_sut("https://x.test");

        let _ = load(&loader, page);

        let url = &client.requested_urls()[0];
        assert_eq!(
            url.query(),
            Some(format!("UnitId=QcbUEzN6E6DL&$top=20&$skip={skip}").as_str())
        );
    }

    #[test]
    fn test_keeps_existing_endpoint_query() {
        let (loader, _client) = make_sut("https://x.test/api?IsTransData=1");

        let url = loader.request_url(PageRequest::new(1));

        assert_eq!(url.path(), "/api");
        assert_eq!(
            url.query(),
            Some("IsTransData=1&UnitId=QcbUEzN6E6DL&$top=20&$skip=20")
        );
    }

    #[test]
    fn test_transport_error_is_connectivity() {
        let (loader, client) = make_sut("https://x.test");
        let received = load(&loader, 0);

        client.fail(0);

        assert_eq!(*received.lock(), vec![Err(PetListError::Connectivity)]);
    }

    #[test_case(199 ; "informational")]
    #[test_case(201 ; "created")]
    #[test_case(300 ; "redirect")]
    #[test_case(400 ; "bad request")]
    #[test_case(500 ; "server error")]
    fn test_non_200_is_invalid_data(code: u16) {
        let (loader, client) = make_sut("https://x.test");
        let received = load(&loader, 0);

        client.complete_with_status(0, code, b"[]");

        assert_eq!(*received.lock(), vec![Err(PetListError::InvalidData)]);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let (loader, client) = make_sut("https://x.test");
        let received = load(&loader, 0);

        client.complete_with_status(0, 200, b"{\"not\": \"a list\"}");

        assert_eq!(*received.lock(), vec![Err(PetListError::InvalidData)]);
    }

    #[test]
    fn test_empty_list() {
        let (loader, client) = make_sut("https://x.test");
        let received = load(&loader, 0);

        client.complete_with_status(0, 200, b"[]");

        assert_eq!(*received.lock(), vec![Ok(vec![])]);
    }

    #[test]
    fn test_delivers_pets_in_server_order() {
        let (loader, client) = make_sut("https://x.test");
        let received = load(&loader, 0);
        let body = br#"[
            {"animal_id": 9, "animal_kind": "Cat", "album_file": "https://img.test/9.jpg",
             "animal_opendate": "2024/02/01", "shelter_name": "North Shelter"},
            {"animal_id": 3, "animal_kind": "Dog", "album_file": ""}
        ]"#;

        client.complete_with_status(0, 200, body);

        let received = received.lock();
        let pets = received[0].as_ref().unwrap();
        let ids: Vec<PetId> = pets.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PetId(9), PetId(3)]);
        assert_eq!(
            pets[0].photo_url.as_ref().map(Url::as_str),
            Some("https://img.test/9.jpg")
        );
        assert_eq!(
            pets[0].opened_on(),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(pets[0].shelter_name, "North Shelter");
        assert_eq!(pets[1].photo_url, None);
    }

    #[test]
    fn test_no_delivery_after_loader_dropped() {
        let (loader, client) = make_sut("https://x.test");
        let received = load(&loader, 0);

        drop(loader);
        client.complete_with_status(0, 200, b"[]");

        assert!(received.lock().is_empty());
    }
}
