mod company;
mod profile;
mod session;

pub use company::{Company, CompanySearchHit};
pub use profile::{
    CreateProfile, EsignTokens, LoginRequest, NormalizedUser, Profile, ProfilePublic,
    RequesterProfile, SignupRequest, StaffActionRequest,
};
pub use session::{Claims, Session, TokenPair};
