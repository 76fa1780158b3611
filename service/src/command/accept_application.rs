//! [`Command`] for accepting a reviewed [`Application`].

use tracerr::Traced;

use crate::{
    domain::{
        application::{self, Event},
        Application,
    },
    Service,
};

use super::{
    transit_application::{self, TransitApplication},
    Command,
};

/// [`Command`] for accepting a reviewed [`Application`].
///
/// Only a [`Pending`] [`Application`] may be accepted.
///
/// [`Pending`]: application::Status::Pending
#[derive(Clone, Debug)]
pub struct AcceptApplication {
    /// ID of the [`Application`] under review.
    pub application_id: application::Id,

    /// Email body to send instead of the default one.
    pub email_body: Option<String>,
}

impl<Db, El, Ml> Command<AcceptApplication> for Service<Db, El, Ml>
where
    Self: Command<
        TransitApplication,
        Ok = Application,
        Err = Traced<transit_application::ExecutionError>,
    >,
{
    type Ok = Application;
    type Err = Traced<transit_application::ExecutionError>;

    async fn execute(
        &self,
        cmd: AcceptApplication,
    ) -> Result<Self::Ok, Self::Err> {
        let AcceptApplication {
            application_id,
            email_body,
        } = cmd;

        self.execute(TransitApplication {
            application_id,
            event: Event::Accept,
            email_body,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
