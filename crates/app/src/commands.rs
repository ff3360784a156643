//! Command execution

use std::io::Write;

use chrono::{Local, NaiveDateTime};
use parkpro_core::{
    ApartmentId, Controller, Directory, Error as CoreError, Offer, SlotId, StayInterval,
    StayRequest, Suggestion, Transition,
};
use parkpro_net::{BookingServer, Error, Result};
use tracing::{info, warn};

use crate::backend::Backend;
use crate::cli::{Command, StayArgs, USAGE};
use crate::state::AppState;

/// Run one command, writing its report to `out`
pub async fn run<W: Write>(command: Command, state: &AppState, out: &mut W) -> Result<()> {
    match command {
        Command::Help => {
            writeln!(out, "{}", USAGE)?;
            Ok(())
        }
        Command::Serve => serve(state, out).await,
        command => {
            let backend = state.backend()?;
            let mut controller = Controller::new(backend.load_state().await?);
            execute(command, state, &backend, &mut controller, out).await
        }
    }
}

async fn execute<W: Write>(
    command: Command,
    state: &AppState,
    backend: &Backend,
    controller: &mut Controller,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Suggest { apartment, stay } => {
            let directory = &controller.snapshot().directory;
            let request = stay_request(state, directory, &apartment, &stay, None);
            let offer = controller.query(&request);
            print_offer(out, &request, &offer)?;
        }
        Command::Book {
            apartment,
            slot,
            stay,
            guest,
        } => {
            let directory = &controller.snapshot().directory;
            let request = stay_request(state, directory, &apartment, &stay, guest);
            let slot_id = resolve_slot(directory, &slot)?;
            let booking = controller.plan_single(&request, &slot_id)?;
            backend.append_booking(&booking).await?;
            writeln!(
                out,
                "Booked {} for {} ({})",
                directory.slot_name(&booking.slot_id),
                booking.interval(),
                booking.id
            )?;
            controller.apply(Transition::Append(booking));
        }
        Command::BookSplit {
            apartment,
            stay,
            index,
            guest,
        } => {
            let request = stay_request(
                state,
                &controller.snapshot().directory,
                &apartment,
                &stay,
                guest,
            );
            let offer = controller.query(&request);
            let split = index
                .checked_sub(1)
                .and_then(|i| offer.split.get(i))
                .ok_or_else(|| {
                    CoreError::InvalidOperation(format!(
                        "no split option {} for this stay ({} offered)",
                        index,
                        offer.split.len()
                    ))
                })?;
            let [first, second] = controller.plan_split(&request, split)?;

            backend.append_booking(&first).await?;
            if let Err(e) = backend.append_booking(&second).await {
                warn!(booking_id = %first.id, error = %e, "Second half failed, undoing first");
                if let Err(undo) = backend.remove_booking(first.id).await {
                    warn!(booking_id = %first.id, error = %undo, "Could not undo first half");
                }
                return Err(e);
            }

            let directory = &controller.snapshot().directory;
            for booking in [&first, &second] {
                writeln!(
                    out,
                    "Booked {} for {} ({})",
                    directory.slot_name(&booking.slot_id),
                    booking.interval(),
                    booking.id
                )?;
            }
            controller.apply(Transition::Append(first));
            controller.apply(Transition::Append(second));
        }
        Command::Cancel { booking_id } => {
            if backend.remove_booking(booking_id).await? {
                writeln!(out, "Cancelled {}", booking_id)?;
                controller.apply(Transition::Remove(booking_id));
            } else {
                return Err(CoreError::NotFound(format!("booking {}", booking_id)).into());
            }
        }
        Command::Log => {
            let history = controller.history();
            if history.is_empty() {
                writeln!(out, "No bookings yet.")?;
            }
            for entry in history {
                writeln!(
                    out,
                    "{}  {}  {}  {}  guest {}  booked {}",
                    entry.booking_id,
                    entry.apartment_name,
                    entry.slot_name,
                    StayInterval::new(entry.start, entry.end),
                    entry.guest_name,
                    entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                )?;
            }
        }
        Command::Status => {
            print_status(out, controller, Local::now().naive_local())?;
        }
        Command::Roster => {
            let directory = &controller.snapshot().directory;
            for apartment in &directory.apartments {
                match apartment
                    .owned_slot()
                    .and_then(|slot_id| directory.find_slot(slot_id))
                {
                    Some(slot) => writeln!(
                        out,
                        "{:<16} {:<10} floor {}",
                        apartment.name,
                        slot.name,
                        slot.floor_label()
                    )?,
                    None => writeln!(out, "{:<16} no parking", apartment.name)?,
                }
            }
        }
        Command::Help | Command::Serve => {}
    }
    Ok(())
}

/// Build the request, keeping unknown apartments so the split search still runs
fn stay_request(
    state: &AppState,
    directory: &Directory,
    input: &str,
    stay: &StayArgs,
    guest: Option<String>,
) -> StayRequest {
    let apartment_id = match directory.lookup_apartment(input) {
        Some(apartment) => apartment.id.clone(),
        None => {
            warn!(apartment = input, "Unknown apartment");
            ApartmentId::new(input)
        }
    };
    let (start, end) = stay.interval(state.check_in, state.check_out);
    let request = StayRequest::new(apartment_id, start, end);
    match guest {
        Some(guest) => request.with_guest(guest),
        None => request,
    }
}

fn resolve_slot(directory: &Directory, input: &str) -> Result<SlotId> {
    Ok(directory.lookup_slot(input)?.id.clone())
}

fn describe(suggestion: &Suggestion) -> String {
    let floor = suggestion.floor.as_deref().unwrap_or("N/A");
    if suggestion.is_priority {
        format!("{} (floor {}, own slot)", suggestion.slot_name, floor)
    } else {
        format!("{} (floor {})", suggestion.slot_name, floor)
    }
}

fn print_offer<W: Write>(out: &mut W, request: &StayRequest, offer: &Offer) -> Result<()> {
    writeln!(out, "{} for {}", request.interval(), request.apartment_id)?;
    if !offer.single.is_empty() {
        writeln!(out, "Free for the whole stay:")?;
        for suggestion in &offer.single {
            writeln!(out, "  {}", describe(suggestion))?;
        }
    } else if !offer.split.is_empty() {
        writeln!(out, "No slot is free for the whole stay. Split options:")?;
        for (i, split) in offer.split.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} until {}, then {}",
                i + 1,
                describe(&split.first),
                split.split_date.format("%b %d"),
                describe(&split.second)
            )?;
        }
    } else {
        writeln!(out, "No parking available for this stay.")?;
    }
    Ok(())
}

fn print_status<W: Write>(out: &mut W, controller: &Controller, now: NaiveDateTime) -> Result<()> {
    let snapshot = controller.snapshot();
    let total = snapshot.directory.slots.len();
    writeln!(
        out,
        "{} of {} slots free at {}",
        controller.free_slot_count(now),
        total,
        now.format("%Y-%m-%d %H:%M")
    )?;
    for booking in snapshot.bookings.iter().filter(|b| b.is_active_at(now)) {
        writeln!(
            out,
            "  {} taken by {} until {}",
            snapshot.directory.slot_name(&booking.slot_id),
            snapshot.directory.apartment_name(&booking.apartment_id),
            booking.end.format("%b %d, %H:%M")
        )?;
    }
    Ok(())
}

/// Host the local database until interrupted
async fn serve<W: Write>(state: &AppState, out: &mut W) -> Result<()> {
    let server_settings = &state.settings.server;
    if server_settings.token.is_empty() {
        return Err(CoreError::Config("server.token must be set to serve".into()).into());
    }
    let bind = server_settings.socket_addr()?;
    let db = state.open_database()?;

    let server = BookingServer::start(bind, server_settings.token.clone(), db).await?;
    writeln!(out, "Serving booking log on {}", server.addr())?;
    out.flush()?;

    tokio::signal::ctrl_c().await?;
    info!("Interrupted");
    server.shutdown();
    Ok(())
}
