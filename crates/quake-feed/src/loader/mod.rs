// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Data loading layer.
//!
//! Issues the earthquake and plate-boundary fetches as two independent
//! tasks on a background tokio runtime. Each result is delivered as a
//! [`LoadEvent`] as soon as it resolves, in whatever order that happens.

mod feed;

pub use feed::{Feed, FeedMagnitude, FeedParseError, FeedPeriod, PLATE_BOUNDARIES_URL};

use std::sync::mpsc;
use std::sync::Arc;

use geojson::GeoJson;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::layer::{EarthquakeLayer, PlateLayer};

/// Errors that can occur while fetching a GeoJSON document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("loader task failed: {0}")]
    Task(String),
}

/// The outcome of one fetch.
#[derive(Debug)]
pub enum LoadEvent {
    Earthquakes(Result<EarthquakeLayer, LoadError>),
    PlateBoundaries(Result<PlateLayer, LoadError>),
}

impl LoadEvent {
    /// Short name of the dataset, for logs and status display.
    #[must_use]
    pub fn dataset(&self) -> &'static str {
        match self {
            LoadEvent::Earthquakes(_) => "earthquakes",
            LoadEvent::PlateBoundaries(_) => "plate boundaries",
        }
    }
}

/// Where to fetch from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub earthquake_url: String,
    pub plates_url: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            earthquake_url: Feed::default().url(),
            plates_url: PLATE_BOUNDARIES_URL.to_string(),
        }
    }
}

/// Fetch and parse one GeoJSON document.
pub async fn fetch_geojson(client: &reqwest::Client, url: &str) -> Result<GeoJson, LoadError> {
    debug!("GET {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    debug!("{} returned {} bytes", url, body.len());
    Ok(body.parse::<GeoJson>()?)
}

type Notify = Arc<dyn Fn() + Send + Sync>;

fn deliver(tx: &mpsc::Sender<LoadEvent>, notify: &Notify, event: LoadEvent) {
    match &event {
        LoadEvent::Earthquakes(Ok(layer)) => {
            info!("Loaded {} earthquakes ({} skipped)", layer.len(), layer.skipped());
        }
        LoadEvent::PlateBoundaries(Ok(layer)) => {
            info!("Loaded {} plate boundary geometries", layer.geometry_count());
        }
        LoadEvent::Earthquakes(Err(e)) | LoadEvent::PlateBoundaries(Err(e)) => {
            warn!("Failed to load {}: {}", event.dataset(), e);
        }
    }
    if tx.send(event).is_err() {
        debug!("Load event receiver dropped");
    }
    notify();
}

/// Run both fetches concurrently, delivering each result independently.
pub async fn load_all(config: LoaderConfig, tx: mpsc::Sender<LoadEvent>, notify: Notify) {
    let client = reqwest::Client::new();

    let quake_task = {
        let client = client.clone();
        let tx = tx.clone();
        let notify = Arc::clone(&notify);
        let url = config.earthquake_url.clone();
        tokio::spawn(async move {
            let result = fetch_geojson(&client, &url)
                .await
                .map(|geojson| EarthquakeLayer::from_geojson(&geojson));
            deliver(&tx, &notify, LoadEvent::Earthquakes(result));
        })
    };

    let plate_task = {
        let tx = tx.clone();
        let notify = Arc::clone(&notify);
        let url = config.plates_url.clone();
        tokio::spawn(async move {
            let result = fetch_geojson(&client, &url)
                .await
                .map(|geojson| PlateLayer::from_geojson(&geojson));
            deliver(&tx, &notify, LoadEvent::PlateBoundaries(result));
        })
    };

    // A panicking task never delivered its event; report it instead.
    if let Err(e) = quake_task.await {
        deliver(&tx, &notify, LoadEvent::Earthquakes(Err(LoadError::Task(e.to_string()))));
    }
    if let Err(e) = plate_task.await {
        deliver(&tx, &notify, LoadEvent::PlateBoundaries(Err(LoadError::Task(e.to_string()))));
    }
}

/// Handle to the background loader.
///
/// Poll it from the UI thread with [`Loader::try_recv`]; `notify` is called
/// after every delivered event so the UI can wake up.
pub struct Loader {
    rx: mpsc::Receiver<LoadEvent>,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}

impl Loader {
    #[must_use]
    pub fn spawn<F>(config: LoaderConfig, notify: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let notify: Notify = Arc::new(notify);

        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to start loader runtime: {}", e);
                    let reason = e.to_string();
                    deliver(&tx, &notify, LoadEvent::Earthquakes(Err(LoadError::Task(reason.clone()))));
                    deliver(&tx, &notify, LoadEvent::PlateBoundaries(Err(LoadError::Task(reason))));
                    return;
                }
            };
            runtime.block_on(load_all(config, tx, notify));
        });

        Self { rx }
    }

    /// Next delivered event, if any, without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<LoadEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per accepted connection.
    async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/feed.geojson")
    }

    const QUAKES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"place":"A","time":1609459200000,"mag":6.1},
         "geometry":{"type":"Point","coordinates":[-95.0,37.0,35.2]}},
        {"type":"Feature","properties":{"place":"B","time":1609459200000,"mag":3.0},
         "geometry":{"type":"Point","coordinates":[-96.0,36.0,5.0]}}
    ]}"#;

    const PLATES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{},
         "geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}
    ]}"#;

    #[tokio::test]
    async fn test_fetch_geojson_ok() {
        let url = serve("200 OK", QUAKES).await;
        let geojson = fetch_geojson(&reqwest::Client::new(), &url).await.unwrap();
        assert_eq!(EarthquakeLayer::from_geojson(&geojson).len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_geojson_status_error() {
        let url = serve("404 Not Found", "{}").await;
        let err = fetch_geojson(&reqwest::Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_geojson_malformed_body() {
        let url = serve("200 OK", "not json at all").await;
        let err = fetch_geojson(&reqwest::Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[tokio::test]
    async fn test_load_all_delivers_both_events() {
        let config = LoaderConfig {
            earthquake_url: serve("200 OK", QUAKES).await,
            plates_url: serve("200 OK", PLATES).await,
        };
        let (tx, rx) = mpsc::channel();
        let notified = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        load_all(
            config,
            tx,
            Arc::new(move || {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }),
        )
        .await;

        let events: Vec<LoadEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(notified.load(std::sync::atomic::Ordering::SeqCst), 2);
        for event in events {
            match event {
                LoadEvent::Earthquakes(result) => assert_eq!(result.unwrap().len(), 2),
                LoadEvent::PlateBoundaries(result) => {
                    assert_eq!(result.unwrap().geometry_count(), 1);
                }
            }
        }
    }

    #[test]
    fn test_loader_reports_unreachable_hosts() {
        let loader = Loader::spawn(
            LoaderConfig {
                earthquake_url: "http://127.0.0.1:1/quakes.geojson".to_string(),
                plates_url: "http://127.0.0.1:1/plates.json".to_string(),
            },
            || {},
        );

        let mut received = Vec::new();
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while received.len() < 2 && std::time::Instant::now() < deadline {
            match loader.try_recv() {
                Some(event) => received.push(event),
                None => std::thread::sleep(Duration::from_millis(20)),
            }
        }

        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|e| matches!(
            e,
            LoadEvent::Earthquakes(Err(LoadError::Http(_)))
                | LoadEvent::PlateBoundaries(Err(LoadError::Http(_)))
        )));
    }
}
