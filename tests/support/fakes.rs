//! In-process upstream fakes with call counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use grabapis::domain::apod::{format_date, Apod, ApodRequest, ApodSelection};
use grabapis::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
    ResourceRef,
};
use grabapis::domain::gif::{Gif, GifImages, GifPage, GifParams};
use grabapis::domain::pagination::{OffsetPagination, Page, PageInfo};
use grabapis::error::FetchError;
use grabapis::port::outbound::upstream::{ApodResponse, ApodSource, CharacterSource, GifSource};

/// Shared switch: when set, every call fails with a clone of the error.
#[derive(Default)]
pub struct Script {
    calls: AtomicUsize,
    failure: Mutex<Option<FetchError>>,
}

impl Script {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: FetchError) {
        *self.failure.lock() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    fn enter(&self) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn apod(date: &str) -> Apod {
    Apod {
        title: format!("Picture {date}"),
        date: date.to_string(),
        explanation: "Dust and gas.".to_string(),
        url: "https://apod.nasa.gov/image.jpg".to_string(),
        hdurl: None,
        media_type: "image".to_string(),
        service_version: "v1".to_string(),
        copyright: None,
        thumbnail_url: None,
    }
}

pub fn character(id: u32) -> Character {
    Character {
        id,
        name: format!("Character {id}"),
        status: "Alive".to_string(),
        species: "Human".to_string(),
        kind: String::new(),
        gender: "Male".to_string(),
        origin: ResourceRef::default(),
        location: ResourceRef::default(),
        image: String::new(),
        episode: Vec::new(),
        url: String::new(),
        created: String::new(),
    }
}

pub fn gif(id: &str) -> Gif {
    Gif {
        id: id.to_string(),
        title: format!("gif {id}"),
        url: format!("https://giphy.com/gifs/{id}"),
        rating: "g".to_string(),
        username: None,
        images: GifImages::default(),
    }
}

#[derive(Default)]
pub struct FakeApods {
    pub script: Script,
}

#[async_trait]
impl ApodSource for FakeApods {
    async fn apod(&self, request: &ApodRequest) -> Result<ApodResponse, FetchError> {
        self.script.enter()?;
        Ok(match request.selection {
            ApodSelection::Today => ApodResponse::Single(apod("2024-06-01")),
            ApodSelection::Date(date) => ApodResponse::Single(apod(&format_date(date))),
            ApodSelection::Range { start, end } => ApodResponse::Many(
                start
                    .iter_days()
                    .take_while(|day| *day <= end)
                    .map(|day| apod(&format_date(day)))
                    .collect(),
            ),
            ApodSelection::Random { count } => {
                ApodResponse::Many((0..count).map(|_| apod("2001-01-01")).collect())
            }
        })
    }
}

/// Three pages of two characters each.
#[derive(Default)]
pub struct FakeCharacters {
    pub script: Script,
}

const CHARACTER_PAGES: u32 = 3;

#[async_trait]
impl CharacterSource for FakeCharacters {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, FetchError> {
        self.script.enter()?;
        let page = filter.page.unwrap_or(1);
        if page > CHARACTER_PAGES {
            return Err(FetchError::api(404, "There is nothing here"));
        }
        let link = |n: u32| format!("https://rickandmortyapi.com/api/character?page={n}");
        Ok(Page {
            info: PageInfo {
                count: u64::from(CHARACTER_PAGES * 2),
                pages: CHARACTER_PAGES,
                next: (page < CHARACTER_PAGES).then(|| link(page + 1)),
                prev: (page > 1).then(|| link(page - 1)),
            },
            results: vec![character(page * 2 - 1), character(page * 2)],
        })
    }

    async fn characters_by_ids(&self, ids: &CharacterIds) -> Result<Vec<Character>, FetchError> {
        self.script.enter()?;
        if ids.as_slice().iter().any(|id| *id > 1000) {
            return Err(FetchError::api(404, "Character not found"));
        }
        Ok(ids.as_slice().iter().copied().map(character).collect())
    }

    async fn locations(&self, _filter: &LocationFilter) -> Result<Page<Location>, FetchError> {
        self.script.enter()?;
        Ok(Page::single(Vec::new()))
    }

    async fn episodes(&self, _filter: &EpisodeFilter) -> Result<Page<Episode>, FetchError> {
        self.script.enter()?;
        Ok(Page::single(Vec::new()))
    }
}

/// 60 trending GIFs served `limit` at a time.
#[derive(Default)]
pub struct FakeGifs {
    pub script: Script,
}

const GIF_TOTAL: u64 = 60;

impl FakeGifs {
    fn page(params: &GifParams) -> GifPage {
        let offset = params.offset.unwrap_or(0);
        let limit = u64::from(params.limit.unwrap_or(25));
        let end = (offset + limit).min(GIF_TOTAL);
        let data: Vec<Gif> = (offset..end).map(|n| gif(&format!("g{n}"))).collect();
        GifPage {
            pagination: OffsetPagination {
                total_count: GIF_TOTAL,
                count: data.len() as u64,
                offset,
            },
            data,
        }
    }
}

#[async_trait]
impl GifSource for FakeGifs {
    async fn trending(&self, params: &GifParams) -> Result<GifPage, FetchError> {
        self.script.enter()?;
        Ok(Self::page(params))
    }

    async fn search(&self, params: &GifParams) -> Result<GifPage, FetchError> {
        self.script.enter()?;
        Ok(Self::page(params))
    }

    async fn random(&self, _params: &GifParams) -> Result<Gif, FetchError> {
        self.script.enter()?;
        let n = self.script.calls();
        Ok(gif(&format!("random{n}")))
    }

    async fn gif(&self, id: &str) -> Result<Gif, FetchError> {
        self.script.enter()?;
        Ok(gif(id))
    }
}

/// One of each fake, shared so tests can inspect them after handing them out.
#[derive(Clone, Default)]
pub struct Fakes {
    pub apods: Arc<FakeApods>,
    pub characters: Arc<FakeCharacters>,
    pub gifs: Arc<FakeGifs>,
}
