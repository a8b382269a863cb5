use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use chrono::NaiveDate;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use reqwest::Url;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use petshelf::application::{
    ChannelDispatcher, Dispatching, LocalPhotoLoader, compose_photo_pipeline, loaders::Job,
};
use petshelf::domain::{
    Completion, LoadTask, PageRequest, PetLoader, PhotoError, PhotoLoader, PhotoStore,
};
use petshelf::infrastructure::{
    AppConfig, CliArgs, Command, FilePhotoStore, ReqwestHttpClient, RemotePetLoader,
    RemotePhotoLoader, StorageManager,
};

/// Remote loader that records whether the pipeline had to ask it.
struct TrackedRemote<R> {
    inner: R,
    used: Arc<AtomicBool>,
}

impl<R: PhotoLoader> PhotoLoader for TrackedRemote<R> {
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        self.used.store(true, Ordering::Relaxed);
        self.inner.load(url, completion)
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

/// Runs queued completions until `result` is delivered.
async fn wait_for<T>(
    jobs: &mut mpsc::UnboundedReceiver<Job>,
    mut result: oneshot::Receiver<T>,
) -> Result<T> {
    loop {
        tokio::select! {
            delivered = &mut result => {
                return delivered.map_err(|_| eyre!("load finished without a result"));
            }
            job = jobs.recv() => match job {
                Some(job) => job(),
                None => return Err(eyre!("completion queue closed")),
            },
        }
    }
}

async fn open_store(config: &AppConfig) -> Result<Arc<FilePhotoStore>> {
    let directory = config
        .effective_cache_dir()
        .unwrap_or_else(|| std::env::temp_dir().join("petshelf").join("photos"));
    let store = FilePhotoStore::open(directory).await?;
    info!(path = %store.directory().display(), "Photo store ready");
    Ok(Arc::new(store))
}

fn show_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

async fn list_pets(
    config: &AppConfig,
    client: ReqwestHttpClient,
    dispatcher: Arc<ChannelDispatcher>,
    jobs: &mut mpsc::UnboundedReceiver<Job>,
    page: u32,
) -> Result<()> {
    let endpoint = Url::parse(&config.api.pets_endpoint)
        .wrap_err_with(|| format!("invalid endpoint {}", config.api.pets_endpoint))?;
    let loader = Dispatching::new(RemotePetLoader::new(endpoint, client), dispatcher);
    let request = PageRequest::new(page);

    let (tx, rx) = oneshot::channel();
    loader.load(
        request,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    let pets = wait_for(jobs, rx).await??;

    println!("# {request}");
    for pet in &pets {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            pet.id,
            pet.kind,
            pet.variety,
            pet.colour,
            pet.shelter_name,
            show_date(pet.opened_on()),
            show_date(pet.updated_on()),
            pet.photo_url.as_ref().map_or("-", Url::as_str),
        );
    }
    if pets.len() == request.size() as usize {
        println!("# more with --page {}", request.next().page());
    }
    info!(page = %request, count = pets.len(), "Listed pets");

    Ok(())
}

async fn fetch_photo(
    config: &AppConfig,
    client: ReqwestHttpClient,
    dispatcher: Arc<ChannelDispatcher>,
    jobs: &mut mpsc::UnboundedReceiver<Job>,
    url: &str,
    output: &Path,
) -> Result<()> {
    let url = Url::parse(url).wrap_err_with(|| format!("invalid photo URL {url}"))?;
    let store = open_store(config).await?;
    let local = Arc::new(LocalPhotoLoader::new(Arc::clone(&store)));
    let remote_used = Arc::new(AtomicBool::new(false));
    let remote = TrackedRemote {
        inner: RemotePhotoLoader::new(client),
        used: Arc::clone(&remote_used),
    };
    let pipeline = Dispatching::new(compose_photo_pipeline(local, remote), dispatcher);

    let (tx, rx) = oneshot::channel();
    let _task = pipeline.load(
        &url,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    let data = wait_for(jobs, rx).await??;

    tokio::fs::write(output, &data)
        .await
        .wrap_err_with(|| format!("failed to write {}", output.display()))?;
    store.flush().await;

    let source = if remote_used.load(Ordering::Relaxed) {
        "remote"
    } else {
        "local store"
    };
    info!(
        url = %url,
        source,
        size = data.len(),
        path = %output.display(),
        "Photo written"
    );
    Ok(())
}

async fn forget_photo(config: &AppConfig, url: &str) -> Result<()> {
    let url = Url::parse(url).wrap_err_with(|| format!("invalid photo URL {url}"))?;
    let store = open_store(config).await?;

    let (tx, rx) = oneshot::channel();
    store.delete(
        &url,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.await.map_err(|_| eyre!("photo store stopped"))??;

    info!(url = %url, "Photo removed from store");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = petshelf::VERSION, "Starting {}", petshelf::NAME);

    let user_agent = config
        .api
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("{}/{}", petshelf::NAME, petshelf::VERSION));
    let client = ReqwestHttpClient::with_settings(&user_agent, config.api.timeout())?;
    let (dispatcher, mut jobs) = ChannelDispatcher::new();
    let dispatcher = Arc::new(dispatcher);

    match &args.command {
        Command::List { page } => {
            list_pets(&config, client, dispatcher, &mut jobs, *page).await
        }
        Command::Photo { url, output } => {
            fetch_photo(&config, client, dispatcher, &mut jobs, url, output).await
        }
        Command::Forget { url } => forget_photo(&config, url).await,
    }
}
