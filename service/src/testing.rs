//! Fakes and fixtures of [`Service`] tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use common::{
    operations::{By, Commit, Deliver, Evaluate, Insert, Select, Transact},
    DateTime,
};
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{
        applicant,
        application::{
            self, BusinessInfo, ChallengeInfo, Decision, Documents,
            FinanceInfo, LoanInfo, ObjectRef, Payload, RegulatoryInfo,
            Residence, Status,
        },
        Applicant, Application, Profile,
    },
    infra::{
        eligibility::{self, Questionnaire},
        mailer::{self, Email},
        Database as _, Eligibility, Mailer, Memory,
    },
    read::application::Summary,
    Config,
};

/// Secret the [`Session`] tokens are signed with.
///
/// [`Session`]: crate::domain::Session
pub(crate) const JWT_SECRET: &[u8] = b"loan-lifecycle-test-secret";

/// [`Service`] running on fakes.
pub(crate) type Service = crate::Service<Memory, Scorer, Outbox>;

/// Scripted answer of a [`Scorer`].
#[derive(Clone, Copy, Debug)]
pub(crate) enum Verdict {
    Eligible,
    Ineligible,
    Unreachable,
}

/// [`Eligibility`] scorer answering with a scripted [`Verdict`].
#[derive(Debug)]
pub(crate) struct Scorer {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl Scorer {
    /// Returns how many times this [`Scorer`] was asked.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Eligibility<Evaluate<Questionnaire>> for Scorer {
    type Ok = Decision;
    type Err = Traced<eligibility::Error>;

    async fn execute(
        &self,
        _: Evaluate<Questionnaire>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.verdict {
            Verdict::Eligible => Ok(Decision::Eligible),
            Verdict::Ineligible => Ok(Decision::Ineligible),
            Verdict::Unreachable => Err(tracerr::new!(
                eligibility::Error::Status(StatusCode::SERVICE_UNAVAILABLE)
            )),
        }
    }
}

/// [`Mailer`] keeping sent [`Email`]s in memory.
#[derive(Clone, Debug, Default)]
pub(crate) struct Outbox {
    sent: Arc<Mutex<Vec<Email>>>,
    failing: Arc<AtomicBool>,
}

impl Outbox {
    /// Returns the [`Email`]s sent so far.
    pub(crate) async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }

    /// Makes every following delivery fail (or succeed again).
    pub(crate) fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Mailer<Deliver<Email>> for Outbox {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Deliver(email): Deliver<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(tracerr::new!(mailer::Error::Status(
                StatusCode::BAD_GATEWAY
            )));
        }
        self.sent.lock().await.push(email);
        Ok(())
    }
}

/// Creates a new [`Service`] over an empty [`Memory`] database.
pub(crate) fn service(verdict: Verdict) -> (Service, Outbox) {
    let outbox = Outbox::default();
    let service = Service::new(
        Config {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                JWT_SECRET,
            ),
            cooldown_months: application::Cooldown::MONTHS,
        },
        Memory::new(),
        Scorer {
            verdict,
            calls: AtomicUsize::new(0),
        },
        outbox.clone(),
    );
    (service, outbox)
}

/// Returns a complete [`Profile`] of the provided [`Applicant`].
pub(crate) fn profile(applicant_id: applicant::Id) -> Profile {
    Profile {
        applicant_id,
        first_name: "Amaka".into(),
        last_name: "Obi".into(),
        other_name: "Chioma".into(),
        date_of_birth: "1990-04-12".into(),
        gender: "Female".into(),
        lga: "Ikeja".into(),
        contact_email: "amaka@example.com".into(),
        phone: "+2348012345678".into(),
        address: "12 Allen Avenue".into(),
        state_of_origin: "Anambra".into(),
        updated_at: DateTime::UNIX_EPOCH.coerce(),
    }
}

/// Returns a [`Payload`] for the provided business.
pub(crate) fn payload(business: &str, industry: &str) -> Payload {
    Payload {
        residence: Residence {
            address: "12 Allen Avenue".into(),
            state: "Lagos".into(),
            bvn: "22212345678".into(),
            nin: "12345678901".into(),
        },
        business: BusinessInfo {
            name: business.into(),
            address: "4 Market Road".into(),
            age: "1-3 years".into(),
            kind: "Sole proprietorship".into(),
            industry: industry.into(),
            lga: "Ikeja".into(),
            town: "Ikeja".into(),
        },
        finance: FinanceInfo {
            bank_account: "Yes".into(),
            digital_payments: "Yes".into(),
            bookkeeping: "Manual records".into(),
        },
        challenge: ChallengeInfo {
            biggest_challenge: "Access to finance".into(),
            government_support: "Loans".into(),
            growth_driver: "More capital".into(),
        },
        loan: LoanInfo {
            sought_before: "No".into(),
            obtained_via: "Not applicable".into(),
            refusal_reason: "Lack of collateral".into(),
        },
        regulatory: RegulatoryInfo {
            issues: "Multiple taxes".into(),
        },
    }
}

/// Returns complete [`Documents`].
pub(crate) fn documents() -> Documents {
    Documents {
        id_card: ObjectRef::new("documents/id-card.png"),
        business_certificate: ObjectRef::new("documents/cac.pdf"),
        registration_number: "RC-100200".into(),
        uploaded_at: DateTime::UNIX_EPOCH.coerce(),
    }
}

/// Returns a not yet stored [`Application`] of a new [`Applicant`] in the
/// provided [`Status`].
pub(crate) fn draft(status: Status) -> Application {
    let mut app = Application::new(
        &profile(applicant::Id::new()),
        payload("Mama Put Foods", "Food"),
        Decision::Eligible,
        DateTime::from_rfc3339("2023-01-01T09:00:00Z")
            .unwrap()
            .coerce(),
    );
    app.status = status;
    if !matches!(status, Status::Accepted1 | Status::Rejected1) {
        app.documents = Some(documents());
    }
    app
}

/// Stores the provided [`Application`] along with its [`Applicant`].
pub(crate) async fn store(service: &Service, app: Application) -> Application {
    store_profile(service, profile(app.applicant_id)).await;

    let tx = service.database().execute(Transact).await.unwrap();
    tx.execute(Insert(app.clone())).await.unwrap();
    tx.execute(Commit).await.unwrap();
    app
}

/// Stores a new [`Application`] in the provided [`Status`].
pub(crate) async fn with_status(
    service: &Service,
    status: Status,
) -> Application {
    store(service, draft(status)).await
}

/// Stores a new [`Application`] awaiting documents.
pub(crate) async fn application(service: &Service) -> Application {
    with_status(service, Status::Accepted1).await
}

/// Registers a new [`Applicant`] with a complete [`Profile`].
pub(crate) async fn applicant(service: &Service) -> applicant::Id {
    let id = applicant::Id::new();
    store_profile(service, profile(id)).await;
    id
}

/// Stores the provided [`Profile`] and its [`Applicant`].
pub(crate) async fn store_profile(service: &Service, profile: Profile) {
    let db = service.database();
    db.execute(Insert(Applicant {
        id: profile.applicant_id,
        created_at: DateTime::UNIX_EPOCH.coerce(),
    }))
    .await
    .unwrap();
    db.execute(Insert(profile)).await.unwrap();
}

/// Returns the stored [`Profile`] of the provided [`Applicant`].
pub(crate) async fn stored_profile(
    service: &Service,
    id: applicant::Id,
) -> Option<Profile> {
    service
        .database()
        .execute(Select(By::<Option<Profile>, _>::new(id)))
        .await
        .unwrap()
}

/// Indicates whether the provided [`Applicant`] is registered.
pub(crate) async fn applicant_exists(
    service: &Service,
    id: applicant::Id,
) -> bool {
    service
        .database()
        .execute(Select(By::<Option<Applicant>, _>::new(id)))
        .await
        .unwrap()
        .is_some()
}

/// Reads the committed state of the provided [`Application`].
pub(crate) async fn reload(
    service: &Service,
    id: application::Id,
) -> Application {
    service
        .database()
        .execute(Select(By::<Option<Application>, _>::new(id)))
        .await
        .unwrap()
        .unwrap()
}

/// Returns [`Summary`]s of the [`Application`]s of an [`Applicant`].
pub(crate) async fn applications_of(
    service: &Service,
    id: applicant::Id,
) -> Vec<Summary> {
    service
        .database()
        .execute(Select(By::<Vec<Summary>, _>::new(id)))
        .await
        .unwrap()
}
