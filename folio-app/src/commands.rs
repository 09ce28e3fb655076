use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use folio_common::HealthReport;
use folio_config::{ContactConfig, SiteConfig};
use folio_contact::{
    ContactForm, Field, FormMessages, FormSettings, Submission, SubmitOutcome, Web3FormsRelay,
};
use folio_typewriter::{CyclerTimings, TextCycler, Typewriter};

use crate::cli::{ContactArgs, TypewriterArgs};

pub async fn run_typewriter(cfg: &SiteConfig, args: TypewriterArgs) -> Result<()> {
    let phrases = if args.phrases.is_empty() {
        cfg.typewriter.phrases.clone()
    } else {
        args.phrases
    };
    let timings = CyclerTimings {
        type_delay: cfg.typewriter.type_delay(),
        delete_delay: cfg.typewriter.delete_delay(),
        hold: cfg.typewriter.hold(),
    };
    let cycler = TextCycler::new(phrases, timings)?;
    let phrase_count = cycler.phrases().len();
    let mut typewriter = Typewriter::new(cycler);
    let mut frames = typewriter.subscribe();
    typewriter.start()?;

    let mut finished_phrases = 0usize;
    let mut was_empty = true;
    let mut out = io::stdout().lock();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let frame = frames.borrow_and_update().clone();
        write!(out, "\r\x1b[2K{}|", frame.displayed)?;
        out.flush()?;

        // A phrase is finished once it has been deleted back to nothing.
        let is_empty = frame.displayed.is_empty();
        if is_empty && !was_empty {
            finished_phrases += 1;
            if args
                .rotations
                .is_some_and(|limit| finished_phrases >= limit * phrase_count)
            {
                break;
            }
        }
        was_empty = is_empty;
    }
    writeln!(out)?;
    typewriter.stop();
    tracing::info!(finished_phrases, "typewriter.finished");
    Ok(())
}

pub async fn run_contact(cfg: &SiteConfig, args: ContactArgs) -> Result<bool> {
    let contact: &ContactConfig = &cfg.contact;
    let access_key = args
        .access_key
        .or_else(|| contact.access_key.clone())
        .ok_or_else(|| anyhow!("no relay access key: set contact.access_key or --access-key"))?;
    let endpoint = args.endpoint.as_deref().unwrap_or(&contact.endpoint);

    let relay = Web3FormsRelay::new(endpoint, access_key)
        .context("failed to build contact relay")?
        .with_timeout(contact.timeout());
    let settings = FormSettings {
        messages: FormMessages {
            sending: contact.messages.sending.clone(),
            success: contact.messages.success.clone(),
            failure: contact.messages.failure.clone(),
        },
        success_reset: contact.success_reset(),
        failure_reset: contact.failure_reset(),
    };
    let form = ContactForm::new(Arc::new(relay), settings);

    form.update_field(Field::Name, args.name);
    form.update_field(Field::Email, args.email);
    form.update_field(Field::Subject, args.subject);
    form.update_field(Field::Message, args.message);

    let mut states = form.subscribe();
    let submit = form.submit();
    tokio::pin!(submit);
    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome?,
            Ok(()) = states.changed() => {
                let snap = states.borrow_and_update().clone();
                if snap.submission == Submission::Sending {
                    eprintln!("{}", snap.result_message);
                }
            }
        }
    };
    println!("{}", form.snapshot().result_message);
    form.stop();

    match outcome {
        SubmitOutcome::Succeeded => Ok(true),
        SubmitOutcome::Failed(reason) => {
            tracing::warn!(?reason, "contact.command.failed");
            Ok(false)
        }
        SubmitOutcome::InFlight | SubmitOutcome::Abandoned => Ok(false),
    }
}

pub fn run_health() -> Result<()> {
    let report = HealthReport::ok();
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
