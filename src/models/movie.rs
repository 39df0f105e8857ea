use serde::{Deserialize, Serialize};

/// Title given to placeholder movies when TMDB has nothing for an id
pub const UNAVAILABLE_TITLE: &str = "Movie information unavailable";

/// Movie as returned to clients, keyed by TMDB id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<Genre>,
}

impl Movie {
    /// Placeholder used when details could not be fetched
    pub fn unavailable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: UNAVAILABLE_TITLE.to_string(),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: None,
            runtime: None,
            genres: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.title != UNAVAILABLE_TITLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie from GET /movie/{id} or an entry of GET /movie/popular
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl From<TmdbMovie> for Movie {
    fn from(movie: TmdbMovie) -> Self {
        Movie {
            id: movie.id.to_string(),
            title: movie.title,
            overview: movie.overview,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            release_date: movie.release_date,
            vote_average: movie.vote_average,
            runtime: movie.runtime,
            genres: movie.genres,
        }
    }
}

/// One page of GET /movie/popular
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPopularPage {
    pub results: Vec<TmdbMovie>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_movie_details_deserialization() {
        let json = r#"{
            "id": 862,
            "title": "Toy Story",
            "overview": "Led by Woody, Andy's toys live happily in his room.",
            "poster_path": "/uXDfjJbdP4ijW5hWSBrPrlKpxab.jpg",
            "release_date": "1995-10-30",
            "vote_average": 7.97,
            "runtime": 81,
            "genres": [{"id": 16, "name": "Animation"}]
        }"#;

        let movie: Movie = serde_json::from_str::<TmdbMovie>(json).unwrap().into();
        assert_eq!(movie.id, "862");
        assert_eq!(movie.title, "Toy Story");
        assert_eq!(movie.runtime, Some(81));
        assert_eq!(movie.genres.len(), 1);
        assert_eq!(movie.backdrop_path, None);
        assert!(movie.is_available());
    }

    #[test]
    fn test_popular_page_entry_without_details_fields() {
        let json = r#"{"page": 1, "results": [{"id": 597, "title": "Titanic", "vote_average": 7.9}]}"#;

        let page: TmdbPopularPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].runtime, None);
        assert!(page.results[0].genres.is_empty());
    }

    #[test]
    fn test_unavailable_placeholder() {
        let movie = Movie::unavailable("123");
        assert_eq!(movie.id, "123");
        assert!(!movie.is_available());

        let value = serde_json::to_value(&movie).unwrap();
        assert!(value.get("overview").is_none());
        assert!(value.get("genres").is_none());
    }
}
