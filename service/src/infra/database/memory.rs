//! In-memory [`Database`] implementation.
//!
//! Writers are serialized. A [`Tx`] works on a private copy of the committed
//! [`Store`], which replaces the committed one on [`Commit`]. Dropping a
//! [`Tx`] without committing discards its changes.

use std::{
    cmp::Reverse,
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use common::{
    operations::{By, Commit, Insert, Select, Transact, Update},
    Range,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        applicant,
        application::{self, Attachment, Rewrite, Transition},
        Applicant, Application, Notification, Profile,
    },
    infra::{database, Database},
    read::application::{
        MonthlyCounts, SameBusiness, StatusCounts, Summary, Year,
    },
};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following [`Commit`] fail (or succeed again).
    pub fn reject_commits(&self, reject: bool) {
        self.0.shared.reject_commits.store(reject, Ordering::SeqCst);
    }

    /// Makes every following [`Notification`] insertion fail (or succeed
    /// again).
    pub fn reject_notifications(&self, reject: bool) {
        self.0
            .shared
            .reject_notifications
            .store(reject, Ordering::SeqCst);
    }
}

/// Data kept by a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// Known [`Applicant`]s.
    applicants: HashMap<applicant::Id, Applicant>,

    /// [`Profile`]s of [`Applicant`]s.
    profiles: HashMap<applicant::Id, Profile>,

    /// Stored [`Application`] aggregates.
    applications: HashMap<application::Id, Application>,

    /// Stored [`Notification`]s in insertion order.
    notifications: Vec<Notification>,
}

impl Store {
    /// Returns [`Summary`]s of the [`Application`]s matching the provided
    /// `filter`, newest first.
    fn summaries<F>(&self, filter: F) -> Vec<Summary>
    where
        F: Fn(&Application) -> bool,
    {
        let mut apps = self
            .applications
            .values()
            .filter(|a| filter(a))
            .collect::<Vec<_>>();
        apps.sort_by_key(|a| (Reverse(a.submitted_at), a.id));
        apps.into_iter().map(Summary::from).collect()
    }
}

/// State shared by all the clients of the same [`Memory`] database.
#[derive(Debug, Default)]
struct Shared {
    /// Committed [`Store`].
    committed: Mutex<Store>,

    /// Lock serializing writers.
    writer: Arc<Mutex<()>>,

    /// Indicator whether [`Commit`]s should fail.
    reject_commits: AtomicBool,

    /// Indicator whether [`Notification`] insertions should fail.
    reject_notifications: AtomicBool,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// [`Shared`] state of the database.
    shared: Arc<Shared>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Shared`] state of the database.
    shared: Arc<Shared>,

    /// Pending changes, if not finished yet.
    open: Arc<Mutex<Option<Open>>>,
}

/// Unfinished [`Tx`].
#[derive(Debug)]
struct Open {
    /// Working copy of the [`Store`].
    store: Store,

    /// Exclusive write access held until the [`Tx`] finishes.
    _writer: OwnedMutexGuard<()>,
}

/// Access to a [`Store`] of a [`Memory`] database.
pub trait Access {
    /// Reads the [`Store`] visible to this client.
    ///
    /// # Errors
    ///
    /// If the [`Store`] is not accessible anymore.
    fn read<R, F>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&Store) -> R;

    /// Modifies the [`Store`] visible to this client.
    ///
    /// # Errors
    ///
    /// If the [`Store`] is not accessible anymore.
    fn write<R, F>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&mut Store) -> R;

    /// Indicates whether [`Notification`] insertions should fail.
    fn rejects_notifications(&self) -> bool;
}

impl Access for NonTx {
    async fn read<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&Store) -> R,
    {
        Ok(f(&*self.shared.committed.lock().await))
    }

    async fn write<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut Store) -> R,
    {
        let _writer = self.shared.writer.lock().await;
        Ok(f(&mut *self.shared.committed.lock().await))
    }

    fn rejects_notifications(&self) -> bool {
        self.shared.reject_notifications.load(Ordering::SeqCst)
    }
}

impl Access for Tx {
    async fn read<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&Store) -> R,
    {
        let open = self.open.lock().await;
        let open = open
            .as_ref()
            .ok_or(Error::Finished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(f(&open.store))
    }

    async fn write<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut Store) -> R,
    {
        let mut open = self.open.lock().await;
        let open = open
            .as_mut()
            .ok_or(Error::Finished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(f(&mut open.store))
    }

    fn rejects_notifications(&self) -> bool {
        self.shared.reject_notifications.load(Ordering::SeqCst)
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] has been already committed.
    #[display("Transaction is already finished")]
    Finished,

    /// [`Commit`] was rejected on purpose.
    #[display("Commit is rejected")]
    CommitRejected,

    /// [`Notification`] insertion was rejected on purpose.
    #[display("Notification is rejected")]
    NotificationRejected,
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let writer = Arc::clone(&self.0.shared.writer).lock_owned().await;
        let store = self.0.shared.committed.lock().await.clone();
        Ok(Memory(Tx {
            shared: Arc::clone(&self.0.shared),
            open: Arc::new(Mutex::new(Some(Open {
                store,
                _writer: writer,
            }))),
        }))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let Open { store, _writer } = self
            .0
            .open
            .lock()
            .await
            .take()
            .ok_or(Error::Finished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;

        if self.0.shared.reject_commits.load(Ordering::SeqCst) {
            return Err(tracerr::new!(database::Error::from(
                Error::CommitRejected
            )));
        }

        *self.0.shared.committed.lock().await = store;
        Ok(())
    }
}

impl<C: Access> Database<Select<By<Option<Applicant>, applicant::Id>>>
    for Memory<C>
{
    type Ok = Option<Applicant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Applicant>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.applicants.get(&id).copied())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Applicant>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(applicant): Insert<Applicant>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                _ = s.applicants.entry(applicant.id).or_insert(applicant);
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Profile>, applicant::Id>>>
    for Memory<C>
{
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.profiles.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Profile>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(profile): Insert<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| drop(s.profiles.insert(profile.applicant_id, profile)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Application>, application::Id>>>
    for Memory<C>
{
    type Ok = Option<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Application>, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.applications.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Summary>, applicant::Id>>>
    for Memory<C>
{
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Summary>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.summaries(|a| a.applicant_id == id))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Summary>, application::Status>>>
    for Memory<C>
{
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Summary>, application::Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = by.into_inner();
        self.0
            .read(|s| s.summaries(|a| a.status == status))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Summary>, Range>>> for Memory<C> {
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Summary>, Range>>,
    ) -> Result<Self::Ok, Self::Err> {
        let range = by.into_inner();
        self.0
            .read(|s| {
                let mut apps = s.applications.values().collect::<Vec<_>>();
                apps.sort_by_key(|a| (a.submitted_at, a.id));
                apps.into_iter()
                    .skip(range.offset() as usize)
                    .take(range.limit() as usize)
                    .map(Summary::from)
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Option<application::SubmissionDateTime>, SameBusiness>>>
    for Memory<C>
{
    type Ok = Option<application::SubmissionDateTime>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<application::SubmissionDateTime>, SameBusiness>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let same = by.into_inner();
        self.0
            .read(|s| {
                s.applications
                    .values()
                    .filter(|a| {
                        a.applicant_id == same.applicant_id
                            && a.business.name == same.name
                            && a.business.industry == same.industry
                    })
                    .map(|a| a.submitted_at)
                    .max()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Insert<Application>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(app): Insert<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| drop(s.applications.insert(app.id, app)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Transition>> for Memory<C> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(tr): Update<Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                s.applications
                    .get_mut(&tr.application_id)
                    .filter(|a| a.status == tr.from)
                    .map(|a| {
                        a.status = tr.to;
                        a.updated_at = tr.at;
                    })
                    .is_some()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Attachment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(att): Insert<Attachment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if let Some(app) = s.applications.get_mut(&att.application_id)
                {
                    app.documents = Some(att.documents);
                }
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Update<Rewrite>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rw): Update<Rewrite>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if let Some(app) = s.applications.get_mut(&rw.application_id) {
                    app.personal = rw.personal;
                    app.business = rw.business;
                    app.finance = rw.finance;
                    app.challenge = rw.challenge;
                    app.loan = rw.loan;
                    app.regulatory = rw.regulatory;
                }
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Notification>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.0.rejects_notifications() {
            return Err(tracerr::new!(database::Error::from(
                Error::NotificationRejected
            )));
        }
        self.0
            .write(|s| s.notifications.push(notification))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Notification>, applicant::Id>>>
    for Memory<C>
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Notification>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| {
                let mut found = s
                    .notifications
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| n.applicant_id == id)
                    .collect::<Vec<_>>();
                // Latest first, insertion order breaks ties.
                found.sort_by_key(|(i, n)| Reverse((n.created_at, *i)));
                found
                    .into_iter()
                    .map(|(_, n)| n.clone())
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<StatusCounts, Option<applicant::Id>>>>
    for Memory<C>
{
    type Ok = StatusCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<StatusCounts, Option<applicant::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        self.0
            .read(|s| {
                s.applications
                    .values()
                    .filter(|a| owner.map_or(true, |id| a.applicant_id == id))
                    .map(|a| (a.status, 1))
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<MonthlyCounts, Year>>> for Memory<C> {
    type Ok = MonthlyCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<MonthlyCounts, Year>>,
    ) -> Result<Self::Ok, Self::Err> {
        let year = i32::from(by.into_inner());
        self.0
            .read(|s| {
                let mut counts = MonthlyCounts::default();
                for app in s.applications.values() {
                    if app.submitted_at.year() == year {
                        counts.add(app.submitted_at.month(), 1);
                    }
                }
                counts
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact, Update},
        DateTime,
    };

    use crate::{
        domain::{
            applicant,
            application::{Status, Transition},
            Applicant, Application,
        },
        infra::Database as _,
        testing,
    };

    use super::Memory;

    fn applicant() -> Applicant {
        Applicant {
            id: applicant::Id::new(),
            created_at: common::DateTime::now().coerce(),
        }
    }

    async fn exists(db: &Memory, id: applicant::Id) -> bool {
        db.execute(Select(By::<Option<Applicant>, _>::new(id)))
            .await
            .unwrap()
            .is_some()
    }

    #[tokio::test]
    async fn hides_uncommitted_writes() {
        let db = Memory::new();
        let a = applicant();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(a)).await.unwrap();
        assert!(!exists(&db, a.id).await);

        tx.execute(Commit).await.unwrap();
        assert!(exists(&db, a.id).await);
    }

    #[tokio::test]
    async fn drops_changes_of_unfinished_tx() {
        let db = Memory::new();
        let a = applicant();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(a)).await.unwrap();
        drop(tx);

        assert!(!exists(&db, a.id).await);
    }

    #[tokio::test]
    async fn rejected_commit_leaves_nothing() {
        let db = Memory::new();
        db.reject_commits(true);
        let a = applicant();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(a)).await.unwrap();
        assert!(tx.execute(Commit).await.is_err());

        assert!(!exists(&db, a.id).await);
        assert!(tx.execute(Commit).await.is_err(), "finished already");
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let db = Memory::new();
        let app = testing::draft(Status::Pending);
        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(app.clone())).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let review = |to| {
            Update(Transition {
                application_id: app.id,
                from: Status::Pending,
                to,
                at: DateTime::now().coerce(),
            })
        };
        assert!(db.execute(review(Status::Accepted2)).await.unwrap());
        assert!(!db.execute(review(Status::Rejected2)).await.unwrap());

        let stored = db
            .execute(Select(By::<Option<Application>, _>::new(app.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, Status::Accepted2);
    }
}
