//! Argument lists to typed entity requests.
//!
//! Every builder checks `company` and the natural id first, then reads the
//! optional fields. Absent optional fields stay `None` so the entity layer
//! applies its defaults (create) or keeps the stored value (edit).

use tracelytics_ledger::{
    CargoDelta, CargoEntry, DeleteRequest, EditBatch, EditDelivery, EditMachine, EditProduct,
    EditProductInstance, EditSite, EditUser, NewBatch, NewDelivery, NewMachine, NewProduct,
    NewProductInstance, NewSite, NewUser,
};
use tracelytics_types::TableName;

use crate::action::{ActionData, ArgList};
use crate::error::SdkResult;

pub fn delete(table: TableName, args: &ArgList) -> SdkResult<DeleteRequest> {
    Ok(DeleteRequest::new(args.company()?, args.natural_id(table)?))
}

pub fn new_batch(args: &ArgList) -> SdkResult<NewBatch> {
    let mut request = NewBatch::new(args.company()?, args.natural_id(TableName::Batch)?);
    request.user_id = args.string("userId")?;
    request.machine_id = args.string("machineId")?;
    request.date = args.string("date")?;
    Ok(request)
}

pub fn edit_batch(args: &ArgList) -> SdkResult<EditBatch> {
    let mut request = EditBatch::new(args.company()?, args.natural_id(TableName::Batch)?);
    request.user_id = args.string("userId")?;
    request.machine_id = args.string("machineId")?;
    request.date = args.string("date")?;
    Ok(request)
}

pub fn new_delivery(data: &ActionData) -> SdkResult<NewDelivery> {
    let args = &data.args;
    let mut request = NewDelivery::new(args.company()?, args.natural_id(TableName::Delivery)?);
    request.shipper_id = args.string("shipperId")?;
    request.driver_id = args.string("driverId")?;
    request.start_time = args.string("startTime")?;
    request.end_time = args.string("endTime")?;
    request.status = args.string("status")?;
    request.cargo = data.cargo::<CargoEntry>()?;
    Ok(request)
}

pub fn edit_delivery(data: &ActionData) -> SdkResult<EditDelivery> {
    let args = &data.args;
    let mut request = EditDelivery::new(args.company()?, args.natural_id(TableName::Delivery)?);
    request.shipper_id = args.string("shipperId")?;
    request.driver_id = args.string("driverId")?;
    request.start_time = args.string("startTime")?;
    request.end_time = args.string("endTime")?;
    request.status = args.string("status")?;
    request.cargo = data.cargo::<CargoDelta>()?;
    Ok(request)
}

pub fn new_machine(args: &ArgList) -> SdkResult<NewMachine> {
    let mut request = NewMachine::new(args.company()?, args.natural_id(TableName::Machine)?);
    request.name = args.string("name")?;
    request.site = args.checksum("site")?;
    Ok(request)
}

pub fn edit_machine(args: &ArgList) -> SdkResult<EditMachine> {
    let mut request = EditMachine::new(args.company()?, args.natural_id(TableName::Machine)?);
    request.name = args.string("name")?;
    request.site = args.checksum("site")?;
    Ok(request)
}

pub fn new_product(args: &ArgList) -> SdkResult<NewProduct> {
    let mut request = NewProduct::new(args.company()?, args.natural_id(TableName::Product)?);
    request.name = args.string("name")?;
    request.description = args.string("description")?;
    Ok(request)
}

pub fn edit_product(args: &ArgList) -> SdkResult<EditProduct> {
    let mut request = EditProduct::new(args.company()?, args.natural_id(TableName::Product)?);
    request.name = args.string("name")?;
    request.description = args.string("description")?;
    Ok(request)
}

pub fn new_product_instance(args: &ArgList) -> SdkResult<NewProductInstance> {
    let mut request = NewProductInstance::new(
        args.company()?,
        args.natural_id(TableName::ProductInstance)?,
    );
    request.product = args.string("product")?;
    request.site_id = args.string("siteId")?;
    Ok(request)
}

pub fn edit_product_instance(args: &ArgList) -> SdkResult<EditProductInstance> {
    let mut request = EditProductInstance::new(
        args.company()?,
        args.natural_id(TableName::ProductInstance)?,
    );
    request.product = args.string("product")?;
    request.site_id = args.string("siteId")?;
    Ok(request)
}

pub fn new_site(args: &ArgList) -> SdkResult<NewSite> {
    let mut request = NewSite::new(args.company()?, args.natural_id(TableName::Site)?);
    request.name = args.string("name")?;
    Ok(request)
}

pub fn edit_site(args: &ArgList) -> SdkResult<EditSite> {
    let mut request = EditSite::new(args.company()?, args.natural_id(TableName::Site)?);
    request.name = args.string("name")?;
    Ok(request)
}

pub fn new_user(args: &ArgList) -> SdkResult<NewUser> {
    let mut request = NewUser::new(args.company()?, args.natural_id(TableName::User)?);
    request.key = args.public_key("key")?;
    request.permissions = args.string("permissions")?;
    Ok(request)
}

pub fn edit_user(args: &ArgList) -> SdkResult<EditUser> {
    let mut request = EditUser::new(args.company()?, args.natural_id(TableName::User)?);
    request.key = args.public_key("key")?;
    request.permissions = args.string("permissions")?;
    Ok(request)
}
