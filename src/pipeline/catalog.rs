use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One named step in the recruiting pipeline. Precedence is carried by
/// [`Stage::rank`], an explicit integer order, so transition legality never
/// depends on string comparison or list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ApplicationReview,
    PhoneScreen,
    VirtualInterview,
    FaceToFace,
    Offered,
    Onboarding,
    Hired,
}

impl Stage {
    /// Every stage in pipeline order.
    pub const ALL: [Stage; 7] = [
        Stage::ApplicationReview,
        Stage::PhoneScreen,
        Stage::VirtualInterview,
        Stage::FaceToFace,
        Stage::Offered,
        Stage::Onboarding,
        Stage::Hired,
    ];

    /// Where new applications enter the pipeline.
    pub const fn first() -> Stage {
        Stage::ApplicationReview
    }

    pub const fn rank(self) -> u8 {
        match self {
            Stage::ApplicationReview => 0,
            Stage::PhoneScreen => 1,
            Stage::VirtualInterview => 2,
            Stage::FaceToFace => 3,
            Stage::Offered => 4,
            Stage::Onboarding => 5,
            Stage::Hired => 6,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::ApplicationReview => "application_review",
            Stage::PhoneScreen => "phone_screen",
            Stage::VirtualInterview => "virtual_interview",
            Stage::FaceToFace => "face_to_face",
            Stage::Offered => "offered",
            Stage::Onboarding => "onboarding",
            Stage::Hired => "hired",
        }
    }

    /// Stages past the offer are reachable only through the dedicated hire
    /// operation, which carries the required hiring details.
    pub const fn is_post_offer(self) -> bool {
        matches!(self, Stage::Onboarding | Stage::Hired)
    }

    /// Archive reason recorded when a candidate is rejected while sitting in
    /// this stage.
    pub const fn archive_reason(self) -> ArchiveReason {
        match self {
            Stage::ApplicationReview => ArchiveReason::RejectedAtReview,
            Stage::PhoneScreen | Stage::VirtualInterview => ArchiveReason::RejectedAtScreen,
            Stage::FaceToFace => ArchiveReason::RejectedAtInterview,
            Stage::Offered => ArchiveReason::RejectedAtOffer,
            Stage::Onboarding | Stage::Hired => ArchiveReason::RejectedAtOnboarding,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = UnknownCatalogValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.label() == value.trim())
            .ok_or_else(|| UnknownCatalogValue {
                kind: "stage",
                value: value.to_string(),
            })
    }
}

/// Why an application was taken out of the active pipeline. Independent of
/// rejection: duplicate intakes are archived without being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveReason {
    RejectedAtReview,
    RejectedAtScreen,
    RejectedAtInterview,
    RejectedAtOffer,
    RejectedAtOnboarding,
    DuplicateProfile,
    Other,
}

impl ArchiveReason {
    pub const fn label(self) -> &'static str {
        match self {
            ArchiveReason::RejectedAtReview => "rejected_at_review",
            ArchiveReason::RejectedAtScreen => "rejected_at_screen",
            ArchiveReason::RejectedAtInterview => "rejected_at_interview",
            ArchiveReason::RejectedAtOffer => "rejected_at_offer",
            ArchiveReason::RejectedAtOnboarding => "rejected_at_onboarding",
            ArchiveReason::DuplicateProfile => "duplicate_profile",
            ArchiveReason::Other => "other",
        }
    }
}

/// Closed rejection vocabulary; anything outside it is invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotQualified,
    CandidateNotInterested,
    LocationIssue,
    CompensationMismatch,
    FailedInterview,
    PositionOnHold,
    Other,
}

impl RejectionReason {
    pub const fn label(self) -> &'static str {
        match self {
            RejectionReason::NotQualified => "not_qualified",
            RejectionReason::CandidateNotInterested => "candidate_not_interested",
            RejectionReason::LocationIssue => "location_issue",
            RejectionReason::CompensationMismatch => "compensation_mismatch",
            RejectionReason::FailedInterview => "failed_interview",
            RejectionReason::PositionOnHold => "position_on_hold",
            RejectionReason::Other => "other",
        }
    }

    const ALL: [RejectionReason; 7] = [
        RejectionReason::NotQualified,
        RejectionReason::CandidateNotInterested,
        RejectionReason::LocationIssue,
        RejectionReason::CompensationMismatch,
        RejectionReason::FailedInterview,
        RejectionReason::PositionOnHold,
        RejectionReason::Other,
    ];
}

impl FromStr for RejectionReason {
    type Err = UnknownCatalogValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RejectionReason::ALL
            .iter()
            .copied()
            .find(|reason| reason.label() == value.trim())
            .ok_or_else(|| UnknownCatalogValue {
                kind: "rejection reason",
                value: value.to_string(),
            })
    }
}

/// Where a candidate application originated. Intake validates the source
/// strictly; unrecognized strings fail rather than defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSource {
    CareerSite,
    JobBoard,
    Referral,
    Recruiter,
    Other,
}

impl ApplicationSource {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationSource::CareerSite => "career_site",
            ApplicationSource::JobBoard => "job_board",
            ApplicationSource::Referral => "referral",
            ApplicationSource::Recruiter => "recruiter",
            ApplicationSource::Other => "other",
        }
    }
}

/// Raised when a catalog lookup receives a value outside the closed vocabulary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownCatalogValue {
    pub kind: &'static str,
    pub value: String,
}
