// ── Command correlation ──
//
// A command either answers immediately or answers PROCESSING with a
// request id that must be polled until it turns SUCCESS or ERROR. The
// poll loop is an explicit two-state machine.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::backoff::PollPolicy;
use crate::error::Error;
use crate::protocol::{RequestId, Response, Status, WireCommand};
use crate::session::Connection;

enum Exchange {
    Pending { request_id: RequestId, polls: u32 },
    Terminal(Response),
}

impl Exchange {
    fn from_initial(response: Response) -> Result<Self, Error> {
        if response.status != Status::Processing {
            return Ok(Self::Terminal(response));
        }
        let request_id = response.request_id.ok_or(Error::MissingRequestId)?;
        debug!(%request_id, "command returned PROCESSING, polling");
        Ok(Self::Pending {
            request_id,
            polls: 0,
        })
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Send `line` and return its terminal response.
    ///
    /// An immediate response is returned as-is, whatever its status. A
    /// polled request resolves to SUCCESS, or fails with the server's
    /// message on ERROR.
    pub(crate) async fn execute(
        &mut self,
        line: &str,
        poll: &PollPolicy,
    ) -> Result<Response, Error> {
        let mut state = Exchange::from_initial(self.round_trip(line).await?)?;

        loop {
            match state {
                Exchange::Terminal(response) => return Ok(response),
                Exchange::Pending { request_id, polls } => {
                    if polls >= poll.max_attempts {
                        return Err(Error::PollExhausted {
                            request_id: request_id.to_string(),
                            attempts: poll.max_attempts,
                        });
                    }
                    tokio::time::sleep(poll.interval).await;

                    let attempt = polls + 1;
                    debug!(%request_id, attempt, "polling request");
                    let response = self
                        .round_trip(&WireCommand::Request(&request_id).to_string())
                        .await?;

                    state = match response.status {
                        Status::Success => Exchange::Terminal(response),
                        Status::Processing => Exchange::Pending {
                            request_id,
                            polls: attempt,
                        },
                        Status::Error => {
                            return Err(Error::Api {
                                message: format!(
                                    "Request {request_id} failed: {}",
                                    response.error_message()
                                ),
                            });
                        }
                        Status::Other(status) => return Err(Error::UnknownStatus { status }),
                    };
                }
            }
        }
    }
}
