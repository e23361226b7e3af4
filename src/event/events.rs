use crate::{
    audio::element::MediaEvent,
    http::{
        models::{
            Credentials, Genre, LoginResponse, NewPlaylist, Playlist, ProfileUpdate,
            RecommendationsByType, RegisterResponse, Registration, Track, TrackId, UploadResponse,
            UserId, UserProfile,
        },
        upload::UploadRequest,
    },
};

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    // Events
    TrendingFetched(Vec<Track>),
    ForYouFetched(Vec<Track>),
    MyTracksFetched(Vec<Track>),
    LikedTracksFetched(Vec<Track>),
    SearchResults(String, Vec<Track>),
    GenresFetched(Vec<Genre>),
    RecommendationsByTypeFetched(RecommendationsByType),
    SimilarTracksFetched(Vec<Track>),
    GenreTracksFetched(i64, Vec<Track>),
    PlaylistsFetched(Vec<Playlist>),
    MyPlaylistsFetched(Vec<Playlist>),
    PlaylistCreated(Playlist),
    PlaylistChanged,
    RecommendationsRefreshed(String),
    LoggedIn(LoginResponse),
    Registered(RegisterResponse),
    LoggedOut,
    ProfileFetched(UserProfile),
    ProfileUpdated(UserProfile),
    LikeToggled(TrackId, bool),
    UploadProgress(u8),
    UploadFinished(UploadResponse),
    UploadFailed(String),
    AuthFailed(String),
    FetchError(String),
    Notice(String),
    Unauthorized,
    Media(MediaEvent),

    // Commands
    PlayTracks(Vec<Track>, usize),
    PlayAll(Vec<Track>),
    QueueTracks(Vec<Track>),
    ClearQueue,
    ToggleLike(TrackId),
    Follow(UserId, String, bool),
    Search(String),
    Login(Credentials),
    Register(Registration),
    Logout,
    UpdateProfile(ProfileUpdate),
    Upload(UploadRequest),
    CreatePlaylist(NewPlaylist),
    AddToPlaylist(i64, TrackId),
    RemoveFromPlaylist(i64, TrackId),
    LoadGenre(i64),
    RefreshRecommendations,
    ClearRecentSearches,
}
