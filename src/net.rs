//! Small helpers for rate-limit friendly networking.
//!
//! The public catalog endpoint is unauthenticated and shared, so transient
//! 429/5xx responses are expected under load. Retries are bounded and
//! jittered; anything still failing after that surfaces to the caller.

use rand::{thread_rng, Rng};

/// Statuses worth retrying. Everything else is the caller's problem.
fn is_transient(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

pub async fn send_with_backoff(
    rb: reqwest::RequestBuilder,
    label: &str,
    max_retries: u8,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut attempt = 0u8;
    loop {
        let res = rb.try_clone().expect("cloneable request").send().await;
        match res {
            Ok(r) => {
                if is_transient(r.status().as_u16()) && attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!(
                        "[net] http {} {} retry={} backoff={}ms",
                        r.status().as_u16(),
                        label,
                        attempt,
                        back_ms
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Ok(r);
            }
            Err(e) => {
                if attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!(
                        "[net] err {} retry={} backoff={}ms : {}",
                        label,
                        attempt,
                        back_ms,
                        e
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Err(e);
            }
        }
    }
}

fn backoff_delay_ms(attempt: u8) -> u64 {
    let base = 300u64.saturating_mul(1u64 << (attempt.min(5) - 1)); // 300,600,1200,2400,4800,9600
    let jitter: u64 = thread_rng().gen_range(0..=250);
    base + jitter
}
