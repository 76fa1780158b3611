//! [`Command`] for rejecting a reviewed [`Application`].

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

/// [`Command`] for rejecting a reviewed [`Application`].
#[derive(Clone, Debug)]
pub struct RejectApplication {
    /// ID of the [`Application`] under review.
    pub application_id: application::Id,

    /// Explanation to email instead of the default text.
    pub email_body: Option<String>,
}

impl<Db, El, Ml> Command<RejectApplication> for Service<Db, El, Ml>
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
        cmd: RejectApplication,
    ) -> Result<Self::Ok, Self::Err> {
        let RejectApplication {
            application_id,
            email_body,
        } = cmd;

        self.execute(TransitApplication {
            application_id,
            event: Event::Reject,
            email_body,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
